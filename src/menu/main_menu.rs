use crate::config::save::save_settings;
use crate::config::types::{Config, EncoderPreset};
use crate::menu::handlers::run_video_merger;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== 自動影片合併系統 ===").cyan().bold());
    println!("{}", style("按 ESC 返回或離開").dim());

    let options = vec!["影片合併", "設定", "離開"];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_video_merger(term, shutdown_signal)?;
            Ok(true)
        }
        Some(1) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(2) | None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style("=== 合併設定 ===").cyan().bold());
        println!("{}", style("按 ESC 返回").dim());
        println!(
            "\n{} {}x{}，preset {}，同時合併 {} 個",
            style("目前設定:").dim(),
            config.settings.target_width,
            config.settings.target_height,
            config.settings.encoder_preset,
            config.settings.max_concurrent_merges
        );
        println!();

        let options = vec!["目標解析度", "編碼 preset", "同時合併數量", "返回"];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇設定")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_resolution_menu(term, config)?,
            Some(1) => show_preset_menu(term, config)?,
            Some(2) => show_concurrency_menu(config)?,
            Some(3) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 重新編碼路徑的目標解析度
fn show_resolution_menu(term: &Term, config: &mut Config) -> Result<()> {
    let resolutions: [(u32, u32); 3] = [(1280, 720), (1920, 1080), (3840, 2160)];
    let items = ["1280x720 (HD)", "1920x1080 (Full HD)", "3840x2160 (4K)"];

    let default_index = resolutions
        .iter()
        .position(|&(w, h)| {
            (w, h) == (config.settings.target_width, config.settings.target_height)
        })
        .unwrap_or(1);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇目標解析度")
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let (width, height) = resolutions[selection];
    if (width, height) != (config.settings.target_width, config.settings.target_height) {
        config.settings.target_width = width;
        config.settings.target_height = height;
        save_settings(&config.settings)?;
        println!("\n{} {width}x{height}", style("設定已儲存:").green());
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 編碼速度與壓縮率的取捨
fn show_preset_menu(term: &Term, config: &mut Config) -> Result<()> {
    let presets = [
        EncoderPreset::Ultrafast,
        EncoderPreset::Superfast,
        EncoderPreset::Veryfast,
        EncoderPreset::Fast,
        EncoderPreset::Medium,
    ];
    let items: Vec<String> = presets.iter().map(ToString::to_string).collect();

    let default_index = presets
        .iter()
        .position(|&p| p == config.settings.encoder_preset)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇編碼 preset")
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let selected = presets[selection];
    if selected != config.settings.encoder_preset {
        config.settings.encoder_preset = selected;
        save_settings(&config.settings)?;
        println!("\n{} {selected}", style("設定已儲存:").green());
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 同時執行的合併請求上限
fn show_concurrency_menu(config: &mut Config) -> Result<()> {
    let value: usize = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("同時合併數量 (1-8)")
        .default(config.settings.max_concurrent_merges)
        .validate_with(|input: &usize| {
            if (1..=8).contains(input) {
                Ok(())
            } else {
                Err("請輸入 1 到 8 之間的數字")
            }
        })
        .interact_text()?;

    if value != config.settings.max_concurrent_merges {
        config.settings.max_concurrent_merges = value;
        save_settings(&config.settings)?;
        println!("\n{} {value}", style("設定已儲存:").green());
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}
