//! blocktui: block-placement puzzle in the terminal. Drop pieces on a 10x10 grid,
//! fill rows and columns to clear them.

mod app;
mod catalog;
mod clear;
mod grid;
mod history;
mod input;
mod logging;
mod oracle;
mod pieces;
mod placement;
mod score;
mod session;
mod shape;
mod storage;
mod theme;
mod ui;
mod unlock;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use session::Session;
use std::path::PathBuf;
use storage::FileStore;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

/// Options derived from CLI that affect how the app runs.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Mode of the current (or next) game; the menu can change it.
    pub mode: GameMode,
    pub no_animation: bool,
    pub no_menu: bool,
    /// Enables the grid wipe and column shift keys.
    pub special_effects: bool,
    pub frame_rate: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_file.as_deref(), args.log_level)?;

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let data_dir = args.data_dir.clone().unwrap_or_else(storage::default_data_dir);
    let store = FileStore::new(data_dir);
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, data_dir = %store.dir().display(), "starting");

    let mut session = Session::new(args.mode, seed, Box::new(store))?;
    if args.reset_unlocks {
        session.reset_unlocks();
        session.new_game(args.mode);
    }

    let config = GameConfig {
        mode: args.mode,
        no_animation: args.no_animation,
        no_menu: args.no_menu,
        special_effects: args.special_effects,
        frame_rate: args.frame_rate,
    };
    let mut app = App::new(config, theme, session);
    app.run()?;
    Ok(())
}

/// Block-placement puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blocktui",
    version,
    about = "Block placement puzzle in the terminal. Fill rows and columns of a 10x10 grid to clear them.",
    long_about = "blocktui is a terminal block-placement puzzle.\n\n\
        Three pieces wait in the rack. Place them anywhere they fit; a full row or column \
        clears and scores. Consecutive clearing placements build a combo. The game ends when \
        no rack piece fits anywhere.\n\n\
        Tokens: rotate, flip, undo and clear-line. High combos and big scores earn more.\n\
        Collection mode unlocks new pieces at 1000, 3000, 7000 and 15000 points. Both modes \
        deal the starter pieces plus everything unlocked so far.\n\n\
        CONTROLS:\n  Arrows / hjkl  Move cursor   1-3 / Tab  Pick piece   Enter/Space  Place\n  \
        r  Rotate   f  Flip   u  Undo   c  Clear-line cursor   p  Pause   n  New game   q / Esc  Quit\n\n\
        With --special-effects: X  Wipe grid   [ / ]  Shift cursor column up / down\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Game mode: classic (board starts 20% filled) or collection (empty board, pieces unlock with score).
    /// Both deal starter pieces plus any unlocked in earlier collection games.
    #[arg(short, long, default_value = "collection")]
    pub mode: GameMode,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable line-clear animation (lines vanish immediately).
    #[arg(long)]
    pub no_animation: bool,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Enable special-effect keys: X wipes the grid, [ and ] shift the cursor's column up or down.
    #[arg(long)]
    pub special_effects: bool,

    /// Seed for piece dealing and the classic starting board. Random if not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Directory for the high score and unlocked pieces. Defaults to $XDG_DATA_HOME/blocktui.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Forget every unlocked piece before starting.
    #[arg(long)]
    pub reset_unlocks: bool,

    /// Append logs to this file. Nothing is logged if not set.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace.
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: LevelFilter,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GameMode {
    /// Board starts partly filled. Deals starters plus previously unlocked pieces;
    /// nothing new unlocks.
    Classic,
    /// Empty board; pieces unlock with score.
    #[default]
    Collection,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::try_parse_from(["blocktui"]).unwrap();
        assert_eq!(args.mode, GameMode::Collection);
        assert_eq!(args.palette, Palette::Normal);
        assert_eq!(args.log_level, LevelFilter::INFO);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_cli_mode_and_seed() {
        let args =
            Args::try_parse_from(["blocktui", "-m", "classic", "--seed", "42", "--palette", "contrast"])
                .unwrap();
        assert_eq!(args.mode, GameMode::Classic);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.palette, Palette::HighContrast);
    }
}
