use crate::dom;
use crate::hud::Hud;
use std::cell::RefCell;
use std::rc::Rc;
use tree_core::{FrameClock, PollOutcome, Session};
use tree_render::GpuContext;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub session: Rc<RefCell<Session>>,
    pub gpu: GpuContext<'static>,
    pub canvas: web::HtmlCanvasElement,
    pub document: web::Document,
    pub clock: FrameClock,
    pub hud: Hud,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let (w, h) = dom::sync_canvas_backing_size(&self.canvas);
        if (w, h) != self.gpu.size() {
            self.gpu.resize(w, h);
            self.session.borrow_mut().set_aspect(self.gpu.aspect());
        }

        let time = self.clock.tick();
        let signal = {
            let mut session = self.session.borrow_mut();
            // motion side: gated by the video producing a new frame
            if let PollOutcome::Failed(err) = session.poll_motion() {
                log::warn!("[frame] camera stopped: {}", err);
            }
            session.frame(time);
            session.signal()
        };
        self.hud.update(&self.document, &signal);

        let session = self.session.borrow();
        match self.gpu.render(&session, time.elapsed) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.gpu.reconfigure(),
            Err(e) => log::debug!("[frame] surface error: {:?}", e),
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
