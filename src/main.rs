//! presso CLI binary entry point.
//!
//! Every command prints exactly one JSON document on stdout, including
//! failures (`{"status":"error",...}`), and exits with the error's numeric
//! code. Logs go to stderr.
//!
//! ```bash
//! presso --workspace ./shop rename --at src/main/java/com/acme/User.java:3:14 --to Customer
//! presso entity-info --file src/main/java/com/acme/Order.java
//! presso create-jpa-repository --file src/main/java/com/acme/Order.java
//! presso files --source-set all
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use presso::cli::{
    run_add_field, run_add_import, run_create_repository, run_cursor_info, run_entity_info,
    run_files, run_main_class, run_rename, Workspace,
};
use presso_core::error::{OutputErrorCode, PressoError};
use presso_core::output::{emit_response, ErrorResponse};
use presso_java::layout::SourceSet;
use presso_java::ops::add::{FieldSpec, Visibility};

// ============================================================================
// CLI Structure
// ============================================================================

/// Java source intelligence: lookup, rename and insertion.
///
/// All output is JSON on stdout.
#[derive(Parser, Debug)]
#[command(name = "presso", version, about = "Java source intelligence for editors and agents")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Workspace root directory (default: current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Source roots for `files`.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum SourceSetArg {
    #[default]
    Main,
    Test,
    All,
}

impl From<SourceSetArg> for SourceSet {
    fn from(arg: SourceSetArg) -> Self {
        match arg {
            SourceSetArg::Main => SourceSet::Main,
            SourceSetArg::Test => SourceSet::Test,
            SourceSetArg::All => SourceSet::All,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the syntax node and identifier kind at a position.
    CursorInfo {
        /// Location: path:line:col (1-indexed).
        #[arg(long)]
        at: String,
    },

    /// Rename the symbol at a position.
    ///
    /// Variables are renamed within their file; classes across the project,
    /// together with conventionally-named variables of that type.
    Rename {
        /// Location of the symbol: path:line:col.
        #[arg(long)]
        at: String,

        /// New name for the symbol.
        #[arg(long)]
        to: String,

        /// Report the edits without writing.
        #[arg(long)]
        dry_run: bool,

        /// Do not rename variables named after a renamed class.
        #[arg(long)]
        no_cascade: bool,
    },

    /// Find the public class declaring `main`.
    MainClass,

    /// Describe the entity in a file and its (possibly inherited) @Id field.
    EntityInfo {
        /// Entity source file.
        #[arg(long)]
        file: String,
    },

    /// Generate `<Entity>Repository extends JpaRepository<Entity, Id>`.
    CreateJpaRepository {
        /// Entity source file.
        #[arg(long)]
        file: String,
    },

    /// Add an import unless it is already present.
    AddImport {
        /// Target source file.
        #[arg(long)]
        file: String,

        /// Qualified name to import (`a.b.C` or `a.b.*`).
        #[arg(long)]
        import: String,
    },

    /// Add a field to a class.
    AddField {
        /// Target source file.
        #[arg(long)]
        file: String,

        /// Class receiving the field.
        #[arg(long = "class")]
        class_name: String,

        /// Field type.
        #[arg(long = "type")]
        type_name: String,

        /// Field name.
        #[arg(long)]
        name: String,

        /// public, protected, private or package.
        #[arg(long, default_value = "private")]
        visibility: Visibility,

        #[arg(long = "static")]
        is_static: bool,

        #[arg(long = "final")]
        is_final: bool,

        /// Initializer expression.
        #[arg(long)]
        value: Option<String>,
    },

    /// List the Java files of the workspace.
    Files {
        #[arg(long, value_enum, default_value = "main")]
        source_set: SourceSetArg,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), PressoError> {
    let root = match cli.global.workspace {
        Some(root) => root,
        None => std::env::current_dir()
            .map_err(|e| PressoError::internal(format!("cannot read current directory: {}", e)))?,
    };
    let workspace = Workspace::open(root)?;
    let mut stdout = io::stdout();

    let emitted = match cli.command {
        Command::CursorInfo { at } => emit_response(&run_cursor_info(&workspace, &at)?, &mut stdout),
        Command::Rename {
            at,
            to,
            dry_run,
            no_cascade,
        } => emit_response(
            &run_rename(&workspace, &at, &to, dry_run, no_cascade)?,
            &mut stdout,
        ),
        Command::MainClass => emit_response(&run_main_class(&workspace)?, &mut stdout),
        Command::EntityInfo { file } => {
            emit_response(&run_entity_info(&workspace, &file)?, &mut stdout)
        }
        Command::CreateJpaRepository { file } => {
            emit_response(&run_create_repository(&workspace, &file)?, &mut stdout)
        }
        Command::AddImport { file, import } => {
            emit_response(&run_add_import(&workspace, &file, &import)?, &mut stdout)
        }
        Command::AddField {
            file,
            class_name,
            type_name,
            name,
            visibility,
            is_static,
            is_final,
            value,
        } => {
            let spec = FieldSpec {
                visibility,
                is_static,
                is_final,
                value,
                ..FieldSpec::new(type_name, name)
            };
            emit_response(
                &run_add_field(&workspace, &file, &class_name, &spec)?,
                &mut stdout,
            )
        }
        Command::Files { source_set } => {
            emit_response(&run_files(&workspace, source_set.into())?, &mut stdout)
        }
    };
    emitted.map_err(|e| PressoError::internal(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_parsing {
        use super::*;

        #[test]
        fn rename_with_flags() {
            let args = [
                "presso",
                "rename",
                "--at",
                "src/main/java/User.java:3:14",
                "--to",
                "Customer",
                "--dry-run",
                "--no-cascade",
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            match cli.command {
                Command::Rename {
                    at,
                    to,
                    dry_run,
                    no_cascade,
                } => {
                    assert_eq!(at, "src/main/java/User.java:3:14");
                    assert_eq!(to, "Customer");
                    assert!(dry_run);
                    assert!(no_cascade);
                }
                _ => panic!("expected Rename"),
            }
        }

        #[test]
        fn global_args_after_subcommand() {
            let args = [
                "presso",
                "main-class",
                "--workspace",
                "/tmp/shop",
                "--log-level",
                "debug",
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(matches!(cli.command, Command::MainClass));
            assert_eq!(cli.global.workspace, Some(PathBuf::from("/tmp/shop")));
            assert!(matches!(cli.global.log_level, LogLevel::Debug));
        }

        #[test]
        fn add_field_defaults_to_private() {
            let args = [
                "presso", "add-field", "--file", "A.java", "--class", "A", "--type", "Long",
                "--name", "id",
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            match cli.command {
                Command::AddField {
                    class_name,
                    type_name,
                    visibility,
                    is_static,
                    value,
                    ..
                } => {
                    assert_eq!(class_name, "A");
                    assert_eq!(type_name, "Long");
                    assert_eq!(visibility, Visibility::Private);
                    assert!(!is_static);
                    assert!(value.is_none());
                }
                _ => panic!("expected AddField"),
            }
        }

        #[test]
        fn add_field_rejects_unknown_visibility() {
            let args = [
                "presso",
                "add-field",
                "--file",
                "A.java",
                "--class",
                "A",
                "--type",
                "int",
                "--name",
                "n",
                "--visibility",
                "friend",
            ];
            assert!(Cli::try_parse_from(args).is_err());
        }

        #[test]
        fn create_jpa_repository_takes_a_file() {
            let cli =
                Cli::try_parse_from(["presso", "create-jpa-repository", "--file", "Tag.java"])
                    .unwrap();
            match cli.command {
                Command::CreateJpaRepository { file } => assert_eq!(file, "Tag.java"),
                _ => panic!("expected CreateJpaRepository"),
            }
        }

        #[test]
        fn files_source_set() {
            let cli = Cli::try_parse_from(["presso", "files", "--source-set", "all"]).unwrap();
            match cli.command {
                Command::Files { source_set } => {
                    assert!(matches!(SourceSet::from(source_set), SourceSet::All));
                }
                _ => panic!("expected Files"),
            }
        }
    }
}
