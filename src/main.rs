use anyhow::Context;

use markshot::capture::backend::{ArboardClipboard, DirectSave, RfdSaveDialog, XcapDisplays};
use markshot::capture::export::{SaveTarget, default_save_path};
use markshot::capture::stitch;
use markshot::config::Config;
use markshot::session::ports::{Collaborators, NoopFrameSink, SaveDialogPort};
use markshot::session::{DisplaySource, MouseButton, PanelCommand, Session, SessionEvent};

const USAGE: &str = "markshot — grab the whole screen and save it

Usage: markshot [--clipboard | --ask]

  --clipboard   copy the capture to the clipboard instead of saving
  --ask         pick the destination with a file dialog";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return Ok(());
    }
    let to_clipboard = args.iter().any(|a| a == "--clipboard");
    let ask = args.iter().any(|a| a == "--ask");

    let config = Config::load();
    let mut save_path = None;
    let save_dialog: Box<dyn SaveDialogPort> = if ask {
        Box::new(RfdSaveDialog {
            location: config.save_location,
        })
    } else {
        let path =
            default_save_path(config.save_location).context("no save directory available")?;
        save_path = Some(path.clone());
        Box::new(DirectSave {
            target: SaveTarget::new(path),
        })
    };

    let mut source = XcapDisplays;
    let displays = source.list_displays()?;
    let canvas = stitch(displays, 1.0);
    let (w, h) = (canvas.logical_width(), canvas.logical_height());
    anyhow::ensure!(w > 0 && h > 0, "no display pixels captured");

    let session = Session::new(canvas, config, Collaborators {
        clipboard: Box::new(ArboardClipboard::default()),
        save_dialog,
        frames: Box::new(NoopFrameSink),
        signals: None,
    });

    // Headless path: select the whole virtual screen, then deliver
    let (tx, rx) = crossbeam_channel::unbounded();
    tx.send(SessionEvent::MousePressed {
        x: 0,
        y: 0,
        button: MouseButton::Left,
    })?;
    tx.send(SessionEvent::MouseMoved { x: w - 1, y: h - 1 })?;
    tx.send(SessionEvent::MouseReleased {
        x: w - 1,
        y: h - 1,
        button: MouseButton::Left,
    })?;
    tx.send(SessionEvent::Panel(if to_clipboard {
        PanelCommand::Confirm
    } else {
        PanelCommand::Save
    }))?;
    drop(tx);

    match session.run(rx) {
        Some(img) => {
            log::debug!("Captured {}x{}", img.width(), img.height());
            if to_clipboard {
                println!("copied {}x{} to clipboard", img.width(), img.height());
            } else if let Some(path) = save_path {
                println!("{}", path.display());
            }
        }
        None => log::warn!("Session closed without a capture"),
    }
    Ok(())
}
