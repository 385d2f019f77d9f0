use anyhow::Result;
use clap::Parser;
use debounced::debounce::Config;
use debounced::runtime::Reactor;
use debounced::task::sleep;
use debounced::time::{Duration, Instant};
use debounced::value::Debounced;
use tracing_subscriber::EnvFilter;

/// Simulated typeahead
///
/// Types `text` one character at a time into a debounced search box and
/// prints every query that settles.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The text to type
    text: String,

    /// Quiet period before a query settles
    #[arg(long, value_name = "DURATION", default_value = "250ms")]
    wait: humantime::Duration,

    /// Delay between keystrokes
    #[arg(long, value_name = "DURATION", default_value = "50ms")]
    gap: humantime::Duration,

    /// Settle on the first keystroke of a burst instead of the last
    #[arg(long)]
    immediate: bool,
}

#[debounced::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config::new(Duration::from(*args.wait)).immediate(args.immediate);
    let gap = Duration::from(*args.gap);

    let start = Instant::now();
    let query = Debounced::with_config(String::new(), Reactor::current(), config);
    query.on_input(move |text: &String| {
        println!("{:>6}ms  search {text:?}", start.elapsed().as_millis());
    });

    let mut typed = String::with_capacity(args.text.len());
    for c in args.text.chars() {
        typed.push(c);
        query.set_value(typed.clone());
        tracing::debug!(value = %typed, "keystroke");
        if c.is_whitespace() {
            // Word boundary: pause like a typist would.
            sleep(gap * 3).await;
        } else {
            sleep(gap).await;
        }
    }

    // Let the last keystroke settle.
    sleep(config.wait + gap).await;
    Ok(())
}
