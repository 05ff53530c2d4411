use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tapline_core::prelude::*;
use tapline_utils::{info, init_logging, warn, LogFormat, LogLevel, LoggingConfig};

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Drive a remote debuggee over its HTTP debugging interface.
#[derive(Parser, Debug)]
#[command(name = "tapline")]
#[command(version)]
#[command(about = "Drive a remote debuggee over its HTTP debugging interface", long_about = None)]
struct Cli
{
    /// Base URL of the remote debuggee
    #[arg(long, global = true, env = "TAPLINE_ENDPOINT", default_value = "http://127.0.0.1:8000/")]
    endpoint: String,

    /// Delay between two polls while the debuggee runs, in milliseconds
    #[arg(long, global = true, env = "TAPLINE_POLL_INTERVAL_MS", default_value_t = 250)]
    poll_interval_ms: u64,

    /// Per-request timeout in milliseconds (0 disables the timeout)
    #[arg(long, global = true, env = "TAPLINE_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    request_timeout_ms: u64,

    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format: pretty or json (overrides TAPLINE_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Poll the debuggee until it stops or ends
    Watch,
    /// Resume execution and wait for the next stop
    Continue,
    /// Execute one step and wait for it to complete
    Step,
    /// Pause execution
    Pause,
    /// Print the current call stack
    Stack
    {
        /// First frame to print (0 = top)
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Number of frames to print (0 = all)
        #[arg(long, default_value_t = 0)]
        count: usize,
    },
    /// Replace every breakpoint of a file
    Break
    {
        /// Path of the source file
        path: String,
        /// Lines to break on, comma separated (empty clears the file)
        #[arg(value_delimiter = ',')]
        lines: Vec<u32>,
    },
    /// List variables of the stack top, or the children of a reference
    Vars
    {
        /// Reference printed by a previous listing (default: the stack scope)
        reference: Option<i64>,
        /// First entry to print
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Number of entries to print (0 = all)
        #[arg(long, default_value_t = 0)]
        count: usize,
    },
    /// Print the value at a dotted path, e.g. `local.items.1`
    Eval
    {
        /// Dotted path of the value
        path: String,
    },
    /// Print the text of a source file
    Source
    {
        /// Path or URI of the source file
        uri: String,
    },
}

impl Cli
{
    fn logging_config(&self) -> CliResult<LoggingConfig>
    {
        let mut config = LoggingConfig::from_env()?;
        if let Some(level) = self.log_level {
            config = config.with_level(level);
        }
        if let Some(format) = self.log_format {
            config = config.with_format(format);
        }
        Ok(config)
    }

    fn session_config(&self) -> tapline_core::Result<SessionConfig>
    {
        let timeout = (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms));
        Ok(SessionConfig::new(&self.endpoint)?
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))?
            .with_request_timeout(timeout))
    }
}

fn main()
{
    let cli = Cli::parse();

    // Logs go to stderr; keep the guard so the log file is flushed on exit
    let _guard = match cli.logging_config().and_then(|config| init_logging(&config).map_err(Into::into)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()>
{
    let config = cli.session_config()?;
    let (session, mut events) = Session::connect(&config)?;
    info!(endpoint = %config.endpoint.base(), command = ?cli.command, "running command");

    match cli.command {
        Commands::Watch => {
            session.start();
            wait_for_stop(&session, &mut events).await?;
        }
        Commands::Continue => {
            session.continue_execution().await;
            wait_for_stop(&session, &mut events).await?;
        }
        Commands::Step => {
            session.step().await;
            wait_for_stop(&session, &mut events).await?;
        }
        Commands::Pause => {
            session.pause().await;
            report_pending(&mut events)?;
        }
        Commands::Stack { start, count } => {
            let frames = session.stack_trace(start, count).await;
            report_pending(&mut events)?;
            for frame in &frames {
                print_frame(frame);
            }
        }
        Commands::Break { path, lines } => {
            let set = session.set_breakpoints(&path, &lines).await;
            report_pending(&mut events)?;
            print_breakpoints(&set, &lines);
        }
        Commands::Vars {
            reference,
            start,
            count,
        } => {
            let reference = reference.map_or(VariableReference::STACK_SCOPE, VariableReference::from);
            if reference != VariableReference::STACK_SCOPE {
                // References come from the tree of the stack top; rebuild it
                // so the ones printed by an earlier run resolve again
                session.list_root(0, 0).await;
            }
            let variables = session.variables(reference, start, count).await;
            report_pending(&mut events)?;
            for variable in &variables {
                print_variable(variable);
            }
        }
        Commands::Eval { path } => {
            let variable = session.evaluate(&path).await;
            report_pending(&mut events)?;
            match variable {
                Some(variable) => print_variable(&variable),
                None => println!("{path}: no value"),
            }
        }
        Commands::Source { uri } => {
            let text = session.source(&uri).await;
            report_pending(&mut events)?;
            print!("{text}");
        }
    }

    session.stop();
    Ok(())
}

/// Print events until execution stops, the session ends or Ctrl-C is pressed.
async fn wait_for_stop(session: &Session, events: &mut SessionEventReceiver) -> CliResult<()>
{
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    return Ok(());
                };
                report(&event)?;
                match event {
                    SessionEvent::Stopped(_) => {
                        if let Some(top) = session.stack_trace(0, 1).await.first() {
                            print_frame(top);
                        }
                        return report_pending(events);
                    }
                    SessionEvent::End => return Ok(()),
                    SessionEvent::Output { .. } => {}
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(%e, "could not listen for Ctrl-C");
                }
                info!("interrupted");
                return Ok(());
            }
        }
    }
}

/// Print every event already queued.
fn report_pending(events: &mut SessionEventReceiver) -> CliResult<()>
{
    while let Ok(event) = events.try_recv() {
        report(&event)?;
    }
    Ok(())
}

/// Print one event; error output becomes the command's error.
fn report(event: &SessionEvent) -> CliResult<()>
{
    match event {
        SessionEvent::Output {
            category: OutputCategory::Stderr,
            text,
        } => Err(format!("session ended: {text}").into()),
        SessionEvent::End => {
            info!("{}", event.describe());
            Ok(())
        }
        _ => {
            println!("{}", event.describe());
            Ok(())
        }
    }
}

fn print_frame(frame: &StackFrame)
{
    println!(
        "#{:<3} {} at {}:{}:{}",
        frame.index, frame.name, frame.source_uri, frame.line, frame.column
    );
}

fn print_breakpoints(set: &BreakpointSet, requested: &[u32])
{
    println!("{}", set.source_uri);
    for line in requested {
        let status = if set.is_verified(*line) { "verified" } else { "rejected" };
        println!("  line {line}: {status}");
    }
    for breakpoint in set.breakpoints() {
        if !requested.contains(&breakpoint.line) {
            println!("  line {}: verified", breakpoint.line);
        }
    }
}

fn print_variable(variable: &Variable)
{
    if variable.reference.is_expandable() {
        println!(
            "[{}] {}: {} = {}",
            variable.reference, variable.name, variable.type_name, variable.value
        );
    } else {
        println!("{}: {} = {}", variable.name, variable.type_name, variable.value);
    }
}
