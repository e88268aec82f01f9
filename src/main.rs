use anyhow::Result;
use auto_video_merge::config::Config;
use auto_video_merge::menu::show_main_menu;
use auto_video_merge::signal::setup_shutdown_signal;
use console::{Term, style};
use env_logger::Env;
use log::{info, warn};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal();
    let mut config = Config::new()?;

    loop {
        match show_main_menu(&term, &shutdown_signal, &mut config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style("再見！").green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style("錯誤:").red().bold(), e);
                break;
            }
        }
    }

    Ok(())
}
