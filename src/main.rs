use clap::Parser;
use std::{
    error::Error,
    fs,
    io::{self, BufRead},
    path::PathBuf,
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use typetrial::{
    app_dirs::AppDirs,
    config::{ConfigStore, ExperimentConfig, FileConfigStore},
    console::{self, ConsoleCommand},
    finish_gesture::ChainedPressDetector,
    logging::init_logging,
    stage::LogStage,
    Outcome, SessionController, SessionEvent,
};

const TICK_RATE_MS: u64 = 100;

/// Operator console for text-entry experiments across feedback modalities
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// data directory holding config.json, Texts/, Results/ and Discarded/
    #[clap(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// write a starter config.json and texts into the data directory, then exit
    #[clap(long)]
    init_config: bool,

    /// start this experiment right away
    #[clap(long, value_name = "ID", allow_negative_numbers = true)]
    start: Option<i64>,

    /// increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug)]
enum ConsoleEvent {
    Line(String),
    Tick,
    Closed,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let dirs = AppDirs::resolve(cli.data_dir.clone());
    if cli.init_config {
        init_data_dir(&dirs)?;
        println!("{}", dirs.config_path().display());
        return Ok(());
    }

    let mut controller = SessionController::new(&dirs, LogStage);
    match controller.preload() {
        Ok(n) => info!(
            "{n} experiment sequence(s) loaded from {}",
            controller.config_location().display()
        ),
        Err(e) => warn!("{e}; run with --init-config to create one"),
    }

    if let Some(id) = cli.start {
        report(controller.dispatch(SessionEvent::Start(id)));
    }

    run(&mut controller, get_console_events())
}

fn run(
    controller: &mut SessionController,
    events: mpsc::Receiver<ConsoleEvent>,
) -> Result<(), Box<dyn Error>> {
    let mut finish_button = ChainedPressDetector::default();

    loop {
        match events.recv()? {
            ConsoleEvent::Tick => finish_button.tick(Instant::now()),
            ConsoleEvent::Closed => break,
            ConsoleEvent::Line(line) => match console::parse(&line) {
                Ok(None) => {}
                Ok(Some(ConsoleCommand::Quit)) => break,
                Ok(Some(ConsoleCommand::Help)) => println!("{}", console::HELP),
                Ok(Some(ConsoleCommand::ModeNow)) => {
                    println!("{}", controller.current_modality())
                }
                Ok(Some(ConsoleCommand::ConfigLocation)) => {
                    println!("{}", controller.config_location().display())
                }
                Ok(Some(ConsoleCommand::Press)) => {
                    if finish_button.press() {
                        report(controller.dispatch(SessionEvent::Finish));
                    } else {
                        println!("finish {}", finish_button.label());
                    }
                }
                Ok(Some(ConsoleCommand::Session(event))) => report(controller.dispatch(event)),
                Ok(Some(ConsoleCommand::Keys(keys))) => {
                    for key in keys {
                        report(controller.dispatch(SessionEvent::Keystroke(key)));
                    }
                }
                Err(msg) => eprintln!("{msg}"),
            },
        }
    }

    info!("leaving in state {}", controller.state());
    Ok(())
}

/// Errors are already logged by the controller; only rejections are echoed here.
fn report<E>(result: Result<Outcome, E>) {
    if let Ok(Outcome::Rejected(why)) = result {
        eprintln!("ignored: {why:?}");
    }
}

fn init_data_dir(dirs: &AppDirs) -> Result<(), Box<dyn Error>> {
    let store = FileConfigStore::with_path(dirs.config_path());
    let example = ExperimentConfig::example();
    if store.location().exists() {
        warn!("{} already exists, leaving it alone", store.location().display());
    } else {
        store.save(&example)?;
    }

    let texts = dirs.texts_dir();
    fs::create_dir_all(&texts)?;
    let names = example.permutations.iter().flat_map(|p| p.texts.iter());
    for name in names {
        let path = texts.join(format!("{name}.txt"));
        if !path.exists() {
            fs::write(&path, "the quick brown fox\njumps over the lazy dog\n")?;
        }
    }
    fs::create_dir_all(dirs.results_dir())?;
    fs::create_dir_all(dirs.discarded_dir())?;
    Ok(())
}

fn get_console_events() -> mpsc::Receiver<ConsoleEvent> {
    let (tx, rx) = mpsc::channel();

    let tick_x = tx.clone();
    thread::spawn(move || loop {
        if tick_x.send(ConsoleEvent::Tick).is_err() {
            break;
        }

        thread::sleep(Duration::from_millis(TICK_RATE_MS))
    });

    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(ConsoleEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(ConsoleEvent::Closed);
    });

    rx
}
