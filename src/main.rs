use std::env;
use std::path::PathBuf;
use std::process;

use classspin::{Picker, PickerConfig};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: classspin [options]

  --title <text>     window title
  --size <w> <h>     window size in logical pixels
  --store <path>     file holding the roster (default: config dir)
  --font <path>      TrueType/OpenType font for labels
  --pick2            start in pick-two mode
  --mute             disable sound cues
  --help             show this message

Ctrl+Enter spins. RUST_LOG controls log output.";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn usage_error(message: &str) -> ! {
    eprintln!("classspin: {message}\n\n{USAGE}");
    process::exit(2);
}

fn main() {
    init_tracing();

    let mut title: Option<String> = None;
    let mut size: Option<(usize, usize)> = None;
    let mut storage_path: Option<PathBuf> = None;
    let mut font_path: Option<PathBuf> = None;
    let mut pick_two = false;
    let mut mute = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--title" => match args.next() {
                Some(value) => title = Some(value),
                None => usage_error("--title needs a value"),
            },
            "--size" => match (args.next(), args.next()) {
                (Some(w), Some(h)) => match (w.parse::<usize>(), h.parse::<usize>()) {
                    (Ok(w), Ok(h)) if w > 0 && h > 0 => size = Some((w, h)),
                    _ => usage_error("--size needs two positive integers"),
                },
                _ => usage_error("--size needs a width and a height"),
            },
            "--store" => match args.next() {
                Some(value) => storage_path = Some(PathBuf::from(value)),
                None => usage_error("--store needs a path"),
            },
            "--font" => match args.next() {
                Some(value) => font_path = Some(PathBuf::from(value)),
                None => usage_error("--font needs a path"),
            },
            "--pick2" => pick_two = true,
            "--mute" => mute = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return;
            }
            other => usage_error(&format!("unknown argument {other}")),
        }
    }

    let config = PickerConfig::builder()
        .maybe_title(title)
        .maybe_window_width(size.map(|(w, _)| w))
        .maybe_window_height(size.map(|(_, h)| h))
        .maybe_storage_path(storage_path)
        .maybe_font_path(font_path)
        .pick_two(pick_two)
        .mute(mute)
        .build();

    tracing::info!(
        width = config.window_width,
        height = config.window_height,
        pick_two = config.pick_two,
        mute = config.mute,
        "starting classspin"
    );

    let mut picker = Picker::new(config);
    if let Err(err) = picker.show() {
        eprintln!("classspin: {err}");
        process::exit(1);
    }
}
