use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Match the canvas backing store to its CSS size times devicePixelRatio.
/// Returns the new size in physical pixels.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (u32, u32) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = ((rect.width() * dpr) as u32).max(1);
        let h_px = ((rect.height() * dpr) as u32).max(1);
        if canvas.width() != w_px || canvas.height() != h_px {
            canvas.set_width(w_px);
            canvas.set_height(h_px);
        }
    }
    (canvas.width(), canvas.height())
}

#[inline]
pub fn set_text(document: &web::Document, element_id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        el.set_text_content(Some(text));
    }
}

#[inline]
pub fn set_style(document: &web::Document, element_id: &str, style: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let _ = el.set_attribute("style", style);
    }
}
