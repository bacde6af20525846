//! Child-process exit reported through an emitter.
//!
//! A watcher thread spawns an OS process, waits for it, and emits `"exit"` on
//! a shared emitter. The emitter does not know where the event came from.
//!
//! Run with `cargo run -p herald-events --example child_process`.

use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use herald_events::{Arg, Emitter, Listener, args};

fn shell(script: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", script]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }
}

fn main() -> anyhow::Result<()> {
    herald_observability::init();

    let emitter = Arc::new(Emitter::new());

    emitter.on(
        "exit",
        Listener::new(|_, args| {
            let code = args.first().and_then(Arg::as_i64);
            tracing::info!(?code, "child exited");
            Ok(())
        }),
    )?;
    emitter.once(
        "exit",
        Listener::new(|_, args| {
            if let Some(status) = args.get(1).and_then(|a| a.downcast_ref::<ExitStatus>()) {
                println!("first exit: success={}", status.success());
            }
            Ok(())
        }),
    )?;
    emitter.on(
        "error",
        Listener::new(|_, args| {
            eprintln!("child failed: {}", args[0]);
            Ok(())
        }),
    )?;

    let exits = emitter.subscribe("exit")?;

    let watcher = {
        let emitter = Arc::clone(&emitter);
        thread::spawn(move || -> anyhow::Result<()> {
            for script in ["echo hello", "exit 3"] {
                match shell(script).status() {
                    Ok(status) => {
                        let code = status.code().map(i64::from);
                        emitter.emit(
                            "exit",
                            &[Arg::from(serde_json::json!(code)), Arg::opaque(status)],
                        )?;
                    }
                    Err(err) => {
                        emitter.emit("error", &args![anyhow::Error::from(err)])?;
                    }
                }
            }
            Ok(())
        })
    };

    for _ in 0..2 {
        match exits.recv_timeout(Duration::from_secs(5)) {
            Ok(args) => println!("subscription saw exit code {}", args[0]),
            Err(err) => {
                eprintln!("no exit received: {err}");
                break;
            }
        }
    }

    watcher
        .join()
        .map_err(|_| anyhow::anyhow!("watcher thread panicked"))??;
    exits.unsubscribe(&emitter)?;
    Ok(())
}
