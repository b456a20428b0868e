//! Command-line entry point for the PDF password recovery utility.

use clap::{ArgAction, Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use pdf_unlock::{
    BatchOptions, CancelFlag, CrackSession, Encryption, LopdfBackend, SessionState,
    UnlockedArtifact, check_encryption, generate_candidates, run_batch, save_artifact,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use std::error::Error;
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

const EXIT_NOT_FOUND: i32 = 2;
const EXIT_UNLOCK_FAILED: i32 = 3;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// CLI arguments supported by pdf-unlock.
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether a PDF is password protected
    Check {
        #[arg(value_name = "PDF")]
        input: PathBuf,
    },

    /// Try the built-in password dictionary against one or more PDFs
    Crack {
        #[arg(value_name = "PDF", required = true)]
        inputs: Vec<PathBuf>,

        /// Write an unlocked copy when the password is found
        #[arg(short = 'u', long = "unlock", action = ArgAction::SetTrue)]
        unlock: bool,

        /// Directory for unlocked copies (defaults to each PDF's directory)
        #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Number of documents processed in parallel
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },

    /// Test a single password
    Verify {
        #[arg(value_name = "PDF")]
        input: PathBuf,

        #[arg(short = 'p', long = "password")]
        password: String,
    },

    /// Remove encryption using a known password
    Unlock {
        #[arg(value_name = "PDF")]
        input: PathBuf,

        #[arg(short = 'p', long = "password")]
        password: String,

        /// Directory for the unlocked copy (defaults to the PDF's directory)
        #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },

    /// Copy an unlocked PDF to its final location
    Save {
        #[arg(value_name = "ARTIFACT")]
        artifact: PathBuf,

        #[arg(value_name = "DEST")]
        dest: PathBuf,
    },

    /// Print the password dictionary in trial order
    Candidates,
}

/// Entrypoint that sets up logging, runs the requested command and maps
/// the outcome to an exit code.
fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli.command) {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

fn run(command: Command) -> Result<i32, Box<dyn Error>> {
    let backend = LopdfBackend;

    match command {
        Command::Check { input } => {
            match check_encryption(&backend, &input)? {
                Encryption::Encrypted => println!("Encrypted: a password is required"),
                Encryption::Unencrypted => println!("Not Encrypted"),
            }
            Ok(0)
        }
        Command::Crack {
            inputs,
            unlock,
            out_dir,
            threads,
        } => crack(inputs, unlock, out_dir, threads),
        Command::Verify { input, password } => {
            let session =
                CrackSession::start(&backend, input.as_path())?.try_password(&backend, &password)?;
            match session.state() {
                SessionState::Found(found) => {
                    println!("Password is correct");
                    println!("Elapsed: {:.2?}", found.elapsed);
                    Ok(0)
                }
                _ => {
                    println!("Password incorrect");
                    Ok(EXIT_NOT_FOUND)
                }
            }
        }
        Command::Unlock {
            input,
            password,
            out_dir,
        } => {
            let session = CrackSession::start(&backend, input.as_path())?
                .try_password(&backend, &password)?;
            if !matches!(session.state(), SessionState::Found(_)) {
                println!("Password incorrect");
                return Ok(EXIT_UNLOCK_FAILED);
            }
            let session = session.unlock(&backend, out_dir.as_deref())?;
            Ok(report_unlock(session.state()))
        }
        Command::Save { artifact, dest } => {
            let bytes = save_artifact(&artifact, &dest)?;
            println!("Saved: {} ({:.1} KB)", dest.display(), bytes as f64 / 1024.0);
            Ok(0)
        }
        Command::Candidates => {
            for candidate in &generate_candidates() {
                println!("{}", display_password(candidate));
            }
            Ok(0)
        }
    }
}

/// Run the dictionary over every input and print one summary per file.
fn crack(
    inputs: Vec<PathBuf>,
    unlock: bool,
    out_dir: Option<PathBuf>,
    threads: usize,
) -> Result<i32, Box<dyn Error>> {
    if threads == 0 {
        return Err("--threads must be at least 1".into());
    }

    let start = Instant::now();
    let candidates = generate_candidates();
    println!("Testing {} passwords", candidates.len());

    let style = ProgressStyle::with_template(
        "{spinner:.green} {percent:>3}% [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
    )?;
    let bars = MultiProgress::new();
    // One bar per input position, so a path given twice still gets two bars.
    let progress: Vec<ProgressBar> = inputs
        .iter()
        .map(|input| {
            let bar = bars.add(ProgressBar::new(candidates.len() as u64));
            bar.set_style(style.clone());
            bar.set_message(input.display().to_string());
            bar
        })
        .collect();

    let options = BatchOptions {
        threads,
        unlock,
        out_dir,
    };
    let reports = run_batch(
        &LopdfBackend,
        &inputs,
        &candidates,
        &options,
        &CancelFlag::new(),
        |index, _, event| {
            if let Some(bar) = progress.get(index) {
                bar.set_position(event.attempt_index as u64 + 1);
            }
        },
    )?;

    for bar in &progress {
        bar.finish_and_clear();
    }

    let mut exit_code = 0;
    for report in reports {
        println!("PDF: {}", report.source.display());
        let session = match report.result {
            Ok(session) => session,
            Err(e) => {
                eprintln!("Error: {}", e);
                exit_code = exit_code.max(1);
                continue;
            }
        };

        if session.encryption() == Encryption::Unencrypted {
            println!("Not Encrypted");
        }
        let code = match session.state() {
            SessionState::Found(found) => {
                print_found(&found.password, found.attempt_index);
                0
            }
            SessionState::Exhausted { attempts, elapsed } => {
                println!("Password not found after {} attempts.", attempts);
                println!("Time spent: {:.2?}", elapsed);
                EXIT_NOT_FOUND
            }
            SessionState::Cancelled { attempts, .. } => {
                println!("Cancelled after {} attempts.", attempts);
                EXIT_NOT_FOUND
            }
            SessionState::Unlocked { found, .. } | SessionState::UnlockFailed { found, .. } => {
                print_found(&found.password, found.attempt_index);
                report_unlock(session.state())
            }
            SessionState::Idle => EXIT_NOT_FOUND,
        };
        exit_code = exit_code.max(code);
    }

    println!("Elapsed: {:.2?}", start.elapsed());
    Ok(exit_code)
}

fn print_found(password: &str, attempt_index: usize) {
    println!("Password found: {}", display_password(password));
    println!("Found at attempt #{}", attempt_index + 1);
}

fn report_unlock(state: &SessionState) -> i32 {
    match state {
        SessionState::Unlocked { artifact, .. } => {
            print_artifact(artifact);
            0
        }
        SessionState::UnlockFailed { error, .. } => {
            eprintln!("Unlock failed: {}", error);
            EXIT_UNLOCK_FAILED
        }
        _ => EXIT_UNLOCK_FAILED,
    }
}

fn print_artifact(artifact: &UnlockedArtifact) {
    println!("Unlocked: {}", artifact.path.display());
    println!("Pages: {}", artifact.page_count);
    println!("Size: {:.1} KB", artifact.size_bytes as f64 / 1024.0);
}

/// Quote passwords so the empty one stays visible.
fn display_password(password: &str) -> String {
    format!("'{}'", password)
}
