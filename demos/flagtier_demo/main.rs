//! # flagtier demo application
//!
//! A sample CLI that wires a two-level command tree through flagtier. It
//! exists to demonstrate and manually verify the precedence rules.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example flagtier_demo -- echo
//! cargo run --example flagtier_demo -- help
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                | How to exercise it                                                     |
//! |------------------------|------------------------------------------------------------------------|
//! | Declared defaults      | `cargo run --example flagtier_demo -- echo`                            |
//! | Config file flag       | `cargo run --example flagtier_demo -- -c demo.toml echo`               |
//! | Env override           | `FLAGTIER_DEMO_PORT=9999 cargo run --example flagtier_demo -- echo`    |
//! | Flag beats env         | `FLAGTIER_DEMO_PORT=9999 cargo run --example flagtier_demo -- -p 1 echo` |
//! | Repeatable list        | `cargo run --example flagtier_demo -- --tag a,b --tag c echo`          |
//! | Config file via parent | `echo 'pause = "2s"' > w.toml; cargo run --example flagtier_demo -- -c w.toml wait` |
//! | Usage text             | `cargo run --example flagtier_demo -- help`                            |

use std::time::{Duration, Instant};

use anyhow::bail;
use tokio_util::sync::CancellationToken;

use flagtier::{Command, Options, TomlDecoder};

fn main() -> anyhow::Result<()> {
    let mut root = Command::new("flagtier-demo")
        .short_usage("flagtier-demo [flags] <subcommand>")
        .long_help("Resolve a few settings from flags, FLAGTIER_DEMO_* and a TOML file.")
        .options(
            Options::new()
                .config_file_flag("config")
                .decoder(TomlDecoder::new())
                .env_prefix("FLAGTIER_DEMO")
                .env_split(",")
                .ignore_undefined(true),
        );
    let config = root
        .registry_mut()
        .string("config", Some('c'), "", "TOML config file");
    let host = root
        .registry_mut()
        .string("host", None, "localhost", "server host");
    let port = root.registry_mut().int("port", Some('p'), 8080, "server port");
    let tags = root
        .registry_mut()
        .string_list("tag", Some('t'), &[], "tag (repeatable)");
    let verbose = root
        .registry_mut()
        .bool("verbose", Some('v'), false, "print where each value came from");

    let echo = Command::new("echo")
        .short_help("print the resolved settings")
        .exec(move |_, _| {
            println!("host = {}", host.get());
            println!("port = {}", port.get());
            println!("tag  = {:?}", tags.get());
            Ok(())
        });

    let mut wait = Command::new("wait")
        .short_help("sleep for --pause, honouring cancellation")
        .options(
            Options::new()
                .config_file_via(config.clone())
                .decoder(TomlDecoder::new())
                .allow_missing_config_file(true)
                .ignore_undefined(true),
        );
    let pause = wait
        .registry_mut()
        .duration("pause", None, Duration::from_millis(500), "how long to wait");
    let wait = wait.exec(move |token, _| {
        let deadline = Instant::now() + pause.get();
        while Instant::now() < deadline {
            if token.is_cancelled() {
                bail!("wait cancelled");
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        println!("waited {}", flagtier::value::format_duration(&pause.get()));
        Ok(())
    });

    let help = Command::new("help").short_help("show this text");

    let mut root = root.subcommand(echo).subcommand(wait).subcommand(help);
    root.parse(std::env::args().skip(1))?;

    let wants_help = root
        .resolution()
        .and_then(|r| r.args.first())
        .is_none_or(|first| first.eq_ignore_ascii_case("help"));
    if wants_help {
        print!("{}", root.usage());
        return Ok(());
    }

    if verbose.get() {
        if let Some(resolution) = root.resolution() {
            for (name, source) in &resolution.provenance {
                eprintln!("{name}: {source}");
            }
        }
    }
    root.run(&CancellationToken::new())?;
    Ok(())
}
