use argh::FromArgs;
use minish::Interpreter;
use std::time::Duration;

/// A minimal interactive command shell with `<`/`>` redirects and `&`
/// background execution. Type `exit` to leave.
#[derive(FromArgs)]
struct ShellArgs {
    /// prompt string printed before each read
    #[argh(option, default = "String::from(\"$ \")")]
    prompt: String,

    /// milliseconds between sweeps for terminated background children
    #[argh(option, default = "50")]
    reap_interval_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: ShellArgs = argh::from_env();
    Interpreter::new(args.prompt, Duration::from_millis(args.reap_interval_ms)).run()
}
