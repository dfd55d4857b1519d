//! Abyss Descent headless runner
//!
//! Plays a full run on autopilot against a generated cavern, banks the
//! depth reached into the save and prints a summary. Useful for soak-testing
//! balance changes from a tuning file.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::fs;
    use std::path::PathBuf;

    use clap::Parser;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use abyss_descent::consts::*;
    use abyss_descent::persistence::FileStorage;
    use abyss_descent::sim::{
        FrameDelta, Run, RunEvent, Terrain, TerrainTexture, TickInput, autopilot,
    };
    use abyss_descent::{SaveData, Tuning};

    /// Headless Abyss Descent run
    #[derive(Parser, Debug)]
    #[command(name = "abyss-descent")]
    #[command(author, version, about = "Dive on autopilot and bank the depth", long_about = None)]
    struct Args {
        /// Run seed (random if omitted)
        #[arg(short = 's', long = "seed")]
        seed: Option<u64>,

        /// Give up after this many simulated seconds
        #[arg(short = 't', long = "seconds", default_value_t = 300.0)]
        seconds: f32,

        /// Directory holding the save document
        #[arg(long = "save-dir", default_value = "saves")]
        save_dir: PathBuf,

        /// JSON file overriding balance values
        #[arg(long = "tuning")]
        tuning: Option<PathBuf>,

        /// Verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    }

    /// Host frame length (60 Hz display)
    const FRAME_SECS: f32 = 1.0 / 60.0;

    pub fn main() -> Result<(), Box<dyn Error>> {
        let args = Args::parse();
        let level = if args.verbose { "debug" } else { "info" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

        let tuning = match &args.tuning {
            Some(path) => Tuning::from_json(&fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };
        let mut storage = FileStorage::open(&args.save_dir)?;
        let mut save = SaveData::load(&storage);

        let seed = args.seed.unwrap_or_else(rand::random);
        let mut terrain_rng = Pcg32::seed_from_u64(seed ^ 0x5EAF_100D);
        let texture = TerrainTexture::generate_cavern(
            tuning.world_width as u32,
            tuning.world_height as u32 * 2,
            &mut terrain_rng,
        );
        let terrain = Terrain::new(Some(texture), tuning.solid_alpha_threshold);
        let mut run = Run::new(&save, tuning, terrain, seed);

        let mut accumulator = 0.0f32;
        let mut elapsed = 0.0f32;
        let mut score = None;
        let (mut kills, mut hits, mut offers) = (0u32, 0u32, 0u32);

        while score.is_none() && elapsed < args.seconds {
            elapsed += FRAME_SECS;
            accumulator += FRAME_SECS;
            let mut input = autopilot(&run);

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                for event in run.update(FrameDelta::from_secs(SIM_DT), &input) {
                    match event {
                        RunEvent::EnemyKilled { .. } => kills += 1,
                        RunEvent::PlayerHit { .. } => hits += 1,
                        RunEvent::PowerUpOffered(choices) => {
                            offers += 1;
                            if let Some(&choice) = choices.first() {
                                log::info!("Power-up: {} ({})", choice.name(), choice.description());
                                run.choose_power_up(choice)?;
                            }
                        }
                        RunEvent::RunOver { score: s } => score = Some(s),
                        _ => {}
                    }
                }
                accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                input = TickInput {
                    movement: input.movement,
                    ..TickInput::default()
                };
            }
        }

        let depth = score.unwrap_or_else(|| {
            log::info!("Time limit reached at depth {:.1}", run.depth());
            run.teardown();
            run.depth()
        });
        let earned = save.record_run(depth);
        save.store(&mut storage)?;

        println!("Seed:     {seed}");
        println!("Depth:    {depth:.1}");
        println!("Kills:    {kills}");
        println!("Hits:     {hits}");
        println!("Power-ups {offers}");
        println!("Earned:   {earned} (total {})", save.points);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `Run` through the library directly
    abyss_descent::init_web_logging();
}
