mod args;

use clap::Parser;
use winit::{
    event::*,
    event_loop::{EventLoop, EventLoopWindowTarget},
    keyboard::{Key, NamedKey},
    window::{Window, WindowBuilder},
};

use args::Args;
use tree_core::{CaptureError, FrameClock, PollOutcome, Session, SimulatedSource};
use tree_render::{instance_capacity, GpuContext};

struct App<'w> {
    window: &'w Window,
    gpu: GpuContext<'w>,
    session: Session,
    clock: FrameClock,
    title: String,
}

impl<'w> App<'w> {
    fn frame(&mut self, elwt: &EventLoopWindowTarget<()>) {
        if let PollOutcome::Failed(err) = self.session.poll_motion() {
            log::warn!("[native] camera lost: {err}; keyboard still works");
        }
        let time = self.clock.tick();
        self.session.frame(time);
        self.update_title();

        match self.gpu.render(&self.session, time.elapsed) {
            Ok(_) => self.window.request_redraw(),
            Err(wgpu::SurfaceError::Lost) => self.gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
            Err(e) => log::debug!("[native] surface error: {e:?}"),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.session.set_aspect(self.gpu.aspect());
    }

    fn key(&mut self, key: &Key, elwt: &EventLoopWindowTarget<()>) {
        match key {
            Key::Named(NamedKey::Space) => self.session.toggle_override(),
            Key::Named(NamedKey::Escape) => elwt.exit(),
            Key::Character(c) if c.eq_ignore_ascii_case("r") => self.session.release_override(),
            _ => {}
        }
    }

    // The window title doubles as the HUD.
    fn update_title(&mut self) {
        let signal = self.session.signal();
        let camera = if signal.sensor_active { "on" } else { "off" };
        let mode = if signal.manual_override {
            "manual"
        } else {
            "motion"
        };
        let title = format!(
            "Chaos Tree | {} | chaos {:.2} | camera {} | {}",
            signal.status_label(),
            signal.chaos_level,
            camera,
            mode
        );
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Chaos Tree")
        .build(&event_loop)?;
    let size = window.inner_size();

    let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
    let config = args.tree_config();
    let (grid_w, grid_h) = (config.motion.width, config.motion.height);
    let mut session = Session::new(config, args.seed, aspect)?;
    if args.no_sensor {
        session.capture_failed(&CaptureError::NoDevice);
    } else {
        log::info!("[native] simulated camera at {} fps", args.camera_fps);
        let camera = SimulatedSource::new(grid_w, grid_h, args.camera_fps);
        session.attach_source(Box::new(camera));
    }

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(&window)?;
    let gpu = pollster::block_on(GpuContext::new(
        &instance,
        surface,
        size.width,
        size.height,
        instance_capacity(session.engine()),
    ))?;
    log::info!("[native] space: toggle tree/chaos, r: back to motion, esc: quit");

    let mut app = App {
        window: &window,
        gpu,
        session,
        clock: FrameClock::new(),
        title: String::new(),
    };

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => app.resize(size.width, size.height),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event:
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                },
            ..
        } => app.key(&logical_key, elwt),
        Event::AboutToWait => app.frame(elwt),
        _ => {}
    })?;
    Ok(())
}
