use anyhow::Context;
use clap::Parser;
use glam::Vec3;
use instant::Duration;

use expansion_core::gesture::{domain_key_for_input, normalize_pointer};
use expansion_core::{
    ActivationState, Camera, CaptionDisplay, Domain, ExpansionError, Host, Orchestrator,
    ParticleField, PlaybackToken, RenderBackend, SessionClock, SessionSettings, VoicePlayer,
    DEFAULT_SEED, FOG_DENSITY, PARTICLE_COUNT,
};

const FRAME_RATE: f64 = 60.0;
const VIEWPORT: (f32, f32) = (1280.0, 720.0);
const DEFAULT_VOICE_SECS: f64 = 2.5;
const DEFAULT_RUN_SECS: f64 = 10.0;
const DEFAULT_SCRIPT: &[&str] = &["0.5@1", "5@pointer:1000,200", "7@pointer:300,500", "9@idle"];

// ---------------- Host doubles ----------------

/// Render sink that keeps the latest values and reports them once a second.
#[derive(Default)]
struct LoggingRender {
    bloom: f32,
    time_scale: f32,
    backdrop: [f32; 3],
    fog: [f32; 3],
    size: f32,
    exposure: f32,
    rotation: f32,
    eye: Vec3,
    // where the field center lands on screen, in NDC
    center: Option<Vec3>,
    uploaded_bytes: usize,
}

impl LoggingRender {
    fn report(&self, now: f64, state: ActivationState) {
        log::info!(
            "[render] t={:>5.2}s {:<8} bloom={:.2} exposure={:.2} size={:.2} time_scale={:.2} rot={:.2} eye=({:.2}, {:.2}, {:.2}) center={:?} bg={:?} fog={:?}@{} upload={}B",
            now,
            state,
            self.bloom,
            self.exposure,
            self.size,
            self.time_scale,
            self.rotation,
            self.eye.x,
            self.eye.y,
            self.eye.z,
            self.center.map(|c| (c.x, c.y)),
            self.backdrop,
            self.fog,
            FOG_DENSITY,
            self.uploaded_bytes
        );
    }
}

impl RenderBackend for LoggingRender {
    fn set_bloom_strength(&mut self, strength: f32) {
        self.bloom = strength;
    }
    fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }
    fn set_camera(&mut self, camera: &Camera) {
        self.eye = camera.eye;
        self.center = camera.project(Vec3::ZERO);
    }
    fn set_backdrop(&mut self, rgb: [f32; 3]) {
        self.backdrop = rgb;
    }
    fn set_fog_color(&mut self, rgb: [f32; 3]) {
        self.fog = rgb;
    }
    fn set_particle_size(&mut self, size: f32) {
        self.size = size;
    }
    fn set_exposure(&mut self, exposure: f32) {
        self.exposure = exposure;
    }
    fn set_field_rotation(&mut self, radians: f32) {
        self.rotation = radians;
    }
    fn upload_particles(&mut self, field: &ParticleField) {
        self.uploaded_bytes = field.position_bytes().len() + field.color_bytes().len();
    }
}

/// Pretends every voice line lasts a fixed time, then hands the token back.
struct TimedVoice {
    length_sec: f64,
    now: f64,
    playing: Option<(PlaybackToken, f64)>,
}

impl TimedVoice {
    fn new(length_sec: f64) -> Self {
        Self {
            length_sec,
            now: 0.0,
            playing: None,
        }
    }

    fn finished(&mut self, now: f64) -> Option<PlaybackToken> {
        self.now = now;
        match self.playing {
            Some((token, ends)) if now >= ends => {
                self.playing = None;
                Some(token)
            }
            _ => None,
        }
    }
}

impl VoicePlayer for TimedVoice {
    fn play(&mut self, domain: Domain, token: PlaybackToken) -> Result<(), ExpansionError> {
        if self.length_sec <= 0.0 {
            return Err(ExpansionError::PlaybackRejected(format!(
                "no voice output for {}",
                domain
            )));
        }
        log::info!(
            "[audio] play {} ({:.1}s)",
            domain.voice_asset(),
            self.length_sec
        );
        self.playing = Some((token, self.now + self.length_sec));
        Ok(())
    }

    fn stop(&mut self) {
        if self.playing.take().is_some() {
            log::info!("[audio] stopped");
        }
    }
}

struct LogCaptions;

impl CaptionDisplay for LogCaptions {
    fn show(&mut self, domain: Domain) {
        log::info!("[captions] {}", domain.display_name());
    }
    fn hide(&mut self) {
        log::debug!("[captions] hidden");
    }
}

// ---------------- Script ----------------

#[derive(Clone, Debug, PartialEq)]
enum Action {
    Gesture(String),
    Pointer(f32, f32),
    Idle,
    State(String),
}

#[derive(Clone, Debug, PartialEq)]
struct ScriptEvent {
    at_sec: f64,
    action: Action,
}

fn parse_event(arg: &str) -> anyhow::Result<ScriptEvent> {
    let (at, action) = arg
        .split_once('@')
        .with_context(|| format!("event \"{}\" is not <seconds>@<action>", arg))?;
    let at_sec: f64 = at
        .parse()
        .with_context(|| format!("bad time in event \"{}\"", arg))?;
    let action = if action == "idle" {
        Action::Idle
    } else if let Some(xy) = action.strip_prefix("pointer:") {
        let (x, y) = xy
            .split_once(',')
            .with_context(|| format!("pointer needs x,y in \"{}\"", arg))?;
        let (px, py) = (x.trim().parse()?, y.trim().parse()?);
        let (nx, ny) = normalize_pointer(px, py, VIEWPORT.0, VIEWPORT.1);
        Action::Pointer(nx, ny)
    } else if let Some(name) = action.strip_prefix("state:") {
        Action::State(name.to_owned())
    } else {
        // digits go through the keyboard stub, anything else is a domain key
        let key = domain_key_for_input(action).unwrap_or(action);
        Action::Gesture(key.to_owned())
    };
    Ok(ScriptEvent { at_sec, action })
}

/// Headless domain expansion session driven by a timed event script.
#[derive(Parser, Debug)]
#[command(name = "expansion-native")]
#[command(version)]
struct Cli {
    /// Step frames from the wall clock instead of a simulated 60 Hz clock
    #[arg(long)]
    realtime: bool,

    /// Session length in seconds
    #[arg(long, default_value_t = DEFAULT_RUN_SECS)]
    seconds: f64,

    /// Length of every voice line in seconds; 0 rejects playback
    #[arg(long, default_value_t = DEFAULT_VOICE_SECS)]
    voice: f64,

    /// Number of particles
    #[arg(long, default_value_t = PARTICLE_COUNT)]
    count: usize,

    /// Seed for the particle layout and domain patterns
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Timed events as <seconds>@<action>. Actions: 1/2/3 or a domain key,
    /// pointer:<x>,<y> (1280x720 pixels), idle, state:<name>
    #[arg(value_parser = parse_event)]
    events: Vec<ScriptEvent>,
}

impl Cli {
    fn settings(&self) -> SessionSettings {
        SessionSettings {
            particle_count: self.count,
            seed: self.seed,
            aspect: VIEWPORT.0 / VIEWPORT.1,
            ..SessionSettings::default()
        }
    }

    /// Events in firing order; the demo script when none were given.
    fn script(&self) -> anyhow::Result<Vec<ScriptEvent>> {
        let mut script = if self.events.is_empty() {
            DEFAULT_SCRIPT
                .iter()
                .map(|e| parse_event(e))
                .collect::<anyhow::Result<Vec<_>>>()?
        } else {
            self.events.clone()
        };
        script.sort_by(|a, b| a.at_sec.total_cmp(&b.at_sec));
        Ok(script)
    }
}

// ---------------- Session ----------------

fn apply(action: &Action, orch: &mut Orchestrator, now: f64, host: &mut Host<'_>) {
    match action {
        Action::Gesture(key) => {
            if !orch.on_gesture(key, now, host) {
                log::info!("[script] gesture \"{}\" had no effect", key);
            }
        }
        Action::Pointer(x, y) => orch.pointer_moved(*x, *y),
        Action::Idle => orch.reset_to_idle(now, host),
        Action::State(name) => orch.request_state(name, now, host),
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let script = cli.script()?;
    let mut orch = Orchestrator::new(cli.settings());
    orch.on_state_change(|next, prev| log::debug!("[session] {} -> {}", prev, next));

    let mut render = LoggingRender::default();
    let mut voice = TimedVoice::new(cli.voice);
    let mut captions = LogCaptions;

    orch.enter(0.0, &mut Host::new(&mut render, &mut voice, &mut captions));

    let mut clock = cli.realtime.then(SessionClock::start);
    let step = 1.0 / FRAME_RATE;
    let mut script = script.iter().peekable();
    let mut frame: u64 = 0;
    let mut now = 0.0;
    let mut next_report = 0.0;

    while now < cli.seconds {
        let dt = match clock.as_mut() {
            Some(clock) => {
                std::thread::sleep(Duration::from_secs_f64(step));
                let (dt, t) = clock.tick();
                now = t;
                dt
            }
            None => {
                now = frame as f64 * step;
                step as f32
            }
        };
        frame += 1;

        while let Some(event) = script.next_if(|e| e.at_sec <= now) {
            log::info!("[script] t={:.2}s {:?}", now, event.action);
            apply(
                &event.action,
                &mut orch,
                now,
                &mut Host::new(&mut render, &mut voice, &mut captions),
            );
        }

        if let Some(token) = voice.finished(now) {
            orch.voice_finished(token, now, &mut Host::new(&mut render, &mut voice, &mut captions));
        }

        orch.frame(dt, now, &mut Host::new(&mut render, &mut voice, &mut captions));

        if now >= next_report {
            render.report(now, orch.state());
            next_report += 1.0;
        }
    }

    log::info!(
        "[session] finished after {} frames in state {}",
        frame,
        orch.state()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    log::info!(
        "[session] {} particles, {} scripted events, {}",
        cli.count,
        cli.script()?.len(),
        if cli.realtime { "realtime" } else { "simulated 60 Hz" }
    );
    run(&cli)
}
