use lox_interp::{Environment, Error};
use log::{debug, error, info};
use rustyline::{error::ReadlineError, DefaultEditor};

type DynResult = Result<(), Box<dyn std::error::Error>>;

const EXIT_USAGE: i32 = 64;
const EXIT_COMMAND: &str = ".exit";

fn main() -> DynResult {
    if let Err(e) = dotenvy::dotenv() {
        debug!("dotenvy load with error {}", e);
    }
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<String>>();
    debug!("{:?}", args);

    match args.as_slice() {
        [] => repl(),
        [path] => read_from_file(path),
        _ => {
            eprintln!("Usage: lox-interp [script]");
            std::process::exit(EXIT_USAGE);
        }
    }
}

fn repl() -> DynResult {
    info!("Running in REPL mode");

    let mut rl = DefaultEditor::new()?;
    let mut environment = Environment::with_stdout();

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                if line.trim() == EXIT_COMMAND {
                    break;
                }
                rl.add_history_entry(&line)?;
                if let Ok(value) = run_stmt(line.trim_end(), &mut environment) {
                    info!("{:?}", value);
                }
            }
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => break,
            Err(err) => {
                return Err(Box::new(err));
            }
        }
    }

    Ok(())
}

fn read_from_file(file_path: &str) -> DynResult {
    info!("Read from file {}", file_path);
    let contents = match std::fs::read_to_string(file_path) {
        Ok(contents) => contents,
        Err(err) => {
            error!("Reading {} failed: {}", file_path, err);
            return Err(Box::new(err));
        }
    };

    let mut environment = Environment::with_stdout();
    // diagnostics are already on stderr, the run still ends normally
    let _ = run_stmt(&contents, &mut environment);
    Ok(())
}

fn run_stmt(input: &str, environment: &mut Environment) -> Result<lox_interp::Value, Error> {
    lox_interp::run(input, environment).map_err(|err| {
        match &err {
            Error::Scan(_) => debug!("Lex error"),
            Error::Parse(_) => debug!("Parse error"),
            Error::Runtime(_) => debug!("Interpreter error"),
        }
        eprintln!("{}", err);
        err
    })
}
