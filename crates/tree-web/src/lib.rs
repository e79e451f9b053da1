#![cfg(target_arch = "wasm32")]
mod dom;
mod frame;
mod hud;
mod webcam;

use std::cell::RefCell;
use std::rc::Rc;
use tree_core::{FrameClock, Session, TreeConfig, DEFAULT_SEED};
use tree_render::{instance_capacity, GpuContext};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use frame::FrameContext;
use hud::Hud;
use webcam::WebcamSource;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("tree-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("app-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let (width, height) = dom::sync_canvas_backing_size(&canvas);

    let config = TreeConfig::default();
    let (grid_w, grid_h) = (config.motion.width, config.motion.height);
    let aspect = width as f32 / height.max(1) as f32;
    let session = Rc::new(RefCell::new(Session::new(config, DEFAULT_SEED, aspect)?));

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    let capacity = instance_capacity(session.borrow().engine());
    let gpu = GpuContext::new(&instance, surface, width, height, capacity).await?;

    wire_controls(&document, &session);

    let frame_ctx = Rc::new(RefCell::new(FrameContext {
        session: session.clone(),
        gpu,
        canvas,
        document: document.clone(),
        clock: FrameClock::new(),
        hud: Hud::default(),
    }));
    frame::start_loop(frame_ctx);

    // Rendering is already running; the camera joins whenever the user answers
    // the permission prompt, or never.
    spawn_local(async move {
        match WebcamSource::open(&document, grid_w, grid_h).await {
            Ok(cam) => session.borrow_mut().attach_source(Box::new(cam)),
            Err(err) => session.borrow_mut().capture_failed(&err),
        }
    });
    Ok(())
}

fn wire_controls(document: &web::Document, session: &Rc<RefCell<Session>>) {
    {
        let session = session.clone();
        dom::add_click_listener(document, "toggle-btn", move || {
            session.borrow_mut().toggle_override();
        });
    }
    {
        let session = session.clone();
        dom::add_click_listener(document, "motion-btn", move || {
            session.borrow_mut().release_override();
        });
    }

    let Some(window) = web::window() else {
        return;
    };
    let session = session.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        match ev.key().as_str() {
            " " => {
                ev.prevent_default();
                session.borrow_mut().toggle_override();
            }
            "r" | "R" => session.borrow_mut().release_override(),
            _ => {}
        }
    }) as Box<dyn FnMut(web::KeyboardEvent)>);
    let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}
