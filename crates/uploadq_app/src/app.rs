use std::io::BufRead;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use chrono::Local;
use tokio::sync::mpsc;
use uploadq_core::QueueViewModel;
use uploadq_engine::{EngineHandle, ReqwestDeviceApi};
use uploadq_logging::{uploadq_info, uploadq_warn};

use crate::commands::{self, Command, HELP};
use crate::config::AppConfig;
use crate::render::render;

/// Watches one device until the user quits.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let api = ReqwestDeviceApi::new(config.api_settings()).context("creating device client")?;
    let engine = EngineHandle::spawn(config.engine_config(), Arc::new(api));
    let mut views = engine.subscribe();
    let mut input = spawn_stdin_reader();
    let mut input_open = true;

    println!("{HELP}");
    print_view(&views.borrow_and_update().clone());

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    uploadq_warn!("Engine stopped publishing views");
                    break;
                }
                let view = views.borrow_and_update().clone();
                print_view(&view);
            }
            command = input.recv(), if input_open => match command {
                Some(Command::CancelAll) => engine.cancel_all(),
                Some(Command::CancelOne(id)) => {
                    let refusal = commands::cancel_one_refusal(&views.borrow(), &id);
                    match refusal {
                        Some(reason) => println!("{reason}"),
                        None => engine.cancel_one(id),
                    }
                }
                Some(Command::Help) => println!("{HELP}"),
                Some(Command::Unknown(text)) => println!("unknown command {text:?}; {HELP}"),
                Some(Command::Quit) => break,
                // Keep watching without a terminal attached.
                None => input_open = false,
            },
        }
    }

    uploadq_info!("Shutting down");
    engine.shutdown().await;
    Ok(())
}

fn print_view(view: &QueueViewModel) {
    println!();
    for line in render(view, &Local::now()) {
        println!("{line}");
    }
}

fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<Command> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(command) = commands::parse(&line) {
                if tx.send(command).is_err() {
                    break;
                }
            }
        }
    });
    rx
}
