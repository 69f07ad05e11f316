use std::env;

use anyhow::{bail, Context};

use goblins_music::{ContextTracks, LevelProgress, MusicConfig, DEFAULT_CROSSFADE_MS};

const USAGE: &str = "Usage:
  goblins-music tracks <config.json>
  goblins-music resolve <level> [path]
  goblins-music sfx <cue> <out.wav>
  goblins-music play <config.json> <asset_dir> <level> [path] [--seconds <n>]

Commands:
  tracks     List the track table with effective base volumes
  resolve    Show the track selected for a level and door path (e.g. `resolve 3 AB`)
  sfx        Render a sound effect cue to a 16-bit mono WAV file
             (click, jump, coin, hit, win, gameover, powerup)
  play       Play the level's track with a fade-in (requires the `streaming` feature)

Logging is controlled with RUST_LOG, e.g. RUST_LOG=debug.
";

fn print_tracks(config_path: &str) -> anyhow::Result<()> {
    let config = MusicConfig::load(config_path)?;
    println!("Config: {}", config_path);
    println!("  Default volume: {:.2}", config.default_volume);
    println!(
        "  Crossfade:      {} ms",
        config.crossfade_ms.unwrap_or(DEFAULT_CROSSFADE_MS)
    );
    if config.is_empty() {
        println!("\n(no tracks)");
        return Ok(());
    }
    println!();
    println!("{:<20} {:<28} {:>6}  loop", "key", "file", "volume");
    for (key, def) in &config.tracks {
        println!(
            "{:<20} {:<28} {:>6.2}  {}",
            key,
            def.file,
            config.base_volume(key),
            if config.looped(key) { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn parse_progress(level: &str, path: Option<&String>) -> anyhow::Result<LevelProgress> {
    let level: u32 = level
        .parse()
        .with_context(|| format!("Level must be a non-negative integer, got '{}'", level))?;
    let path = path.map(|p| p.to_ascii_uppercase()).unwrap_or_default();
    Ok(LevelProgress::parse(level, &path)?)
}

fn resolve(level: &str, path: Option<&String>) -> anyhow::Result<()> {
    let progress = parse_progress(level, path)?;
    let tracks = ContextTracks::default();
    println!("Level:  {}", progress.level_index());
    println!("Path:   {}", progress.path_string());
    println!("Branch: {}", progress.path_choice());
    println!("Track:  {}", tracks.resolve(progress.music_context()));
    Ok(())
}

#[cfg(feature = "sfx")]
fn render_sfx(cue: &str, out: &str) -> anyhow::Result<()> {
    use goblins_music::{render_cue, write_wav, SfxCue, SFX_SAMPLE_RATE};

    let cue: SfxCue = cue.parse()?;
    let samples = render_cue(cue, SFX_SAMPLE_RATE);
    write_wav(out, &samples, SFX_SAMPLE_RATE)?;
    println!(
        "Wrote {} ({} samples, {:.3} s at {} Hz)",
        out,
        samples.len(),
        samples.len() as f32 / SFX_SAMPLE_RATE as f32,
        SFX_SAMPLE_RATE
    );
    Ok(())
}

#[cfg(not(feature = "sfx"))]
fn render_sfx(_cue: &str, _out: &str) -> anyhow::Result<()> {
    bail!("The sfx command requires the \"sfx\" feature")
}

#[cfg(feature = "streaming")]
fn play(args: &[String]) -> anyhow::Result<()> {
    use goblins_music::{MemoryStore, MusicHandle, RodioHost};
    use log::info;
    use std::path::Path;
    use std::time::{Duration, Instant};

    const FRAME: Duration = Duration::from_millis(16);
    const FADE_IN: Duration = Duration::from_millis(600);

    let mut positional = Vec::new();
    let mut seconds = 10u64;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seconds" => {
                let value = iter.next().context("--seconds requires a value")?;
                seconds = value
                    .parse()
                    .with_context(|| format!("Invalid --seconds value '{}'", value))?;
            }
            _ if arg.starts_with('-') => bail!("Unknown flag: {}", arg),
            _ => positional.push(arg),
        }
    }
    let [config_path, asset_dir, level, rest @ ..] = positional.as_slice() else {
        bail!("play needs <config.json> <asset_dir> <level> [path]\n\n{}", USAGE);
    };

    let config = MusicConfig::load(config_path.as_str())?;
    if !Path::new(asset_dir.as_str()).is_dir() {
        bail!("Asset directory '{}' does not exist", asset_dir);
    }
    let progress = parse_progress(level, rest.first().copied())?;

    let (_stream, handle) =
        rodio::OutputStream::try_default().context("Failed to open the default audio output")?;
    let host = RodioHost::new(handle, asset_dir.as_str(), Some(config));

    let music = MusicHandle::new(Box::new(MemoryStore::new()));
    music.bind(Box::new(host));
    // A terminal launch counts as the first interaction.
    music.signals().notify_interaction();

    let ctx = progress.music_context();
    {
        let mut controller = music.lock();
        let key = controller.track_for_context(ctx).to_string();
        info!("level {} branch {} -> \"{}\"", progress.level_index(), progress.path_choice(), key);
        println!("Playing \"{}\" for {} s", key, seconds);
        controller.play_for_context(ctx, Some(FADE_IN));
    }

    let end = Instant::now() + Duration::from_secs(seconds);
    while Instant::now() < end {
        std::thread::sleep(FRAME);
        music.lock().update(FRAME);
    }

    let fade_out = Duration::from_millis(DEFAULT_CROSSFADE_MS);
    music.lock().stop(Some(fade_out));
    let deadline = Instant::now() + fade_out + FRAME * 4;
    while Instant::now() < deadline {
        std::thread::sleep(FRAME);
        music.lock().update(FRAME);
    }
    println!("Done");
    Ok(())
}

#[cfg(not(feature = "streaming"))]
fn play(_args: &[String]) -> anyhow::Result<()> {
    bail!("The play command requires the \"streaming\" feature. Rebuild with `--features streaming`.")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprint!("{}", USAGE);
        return Ok(());
    };

    match (command.as_str(), rest) {
        ("-h" | "--help" | "help", _) => {
            print!("{}", USAGE);
            Ok(())
        }
        ("tracks", [config]) => print_tracks(config),
        ("resolve", [level]) => resolve(level, None),
        ("resolve", [level, path]) => resolve(level, Some(path)),
        ("sfx", [cue, out]) => render_sfx(cue, out),
        ("play", rest) => play(rest),
        _ => {
            eprint!("{}", USAGE);
            bail!("Invalid arguments: {}", args.join(" "))
        }
    }
}
