//! Browser side of the collaborators
//!
//! Rendering stays in the page: it exposes a global `stackHost` object with
//! `addBox`, `removeBox`, `setTransform`, `remapUv` and `render`. The game
//! only passes numbers across, never scene objects.

use glam::Vec3;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement};

use crate::proxy::{BoxShape, Scene, Transform, VisualHandle};
use crate::sim::Axis;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = stackHost, js_name = addBox)]
    fn host_add_box(width: f32, height: f32, depth: f32, x: f32, y: f32, z: f32) -> u32;

    #[wasm_bindgen(js_namespace = stackHost, js_name = removeBox)]
    fn host_remove_box(id: u32);

    #[wasm_bindgen(js_namespace = stackHost, js_name = setTransform)]
    #[allow(clippy::too_many_arguments)]
    fn host_set_transform(
        id: u32,
        x: f32,
        y: f32,
        z: f32,
        qx: f32,
        qy: f32,
        qz: f32,
        qw: f32,
        sx: f32,
        sy: f32,
        sz: f32,
    );

    #[wasm_bindgen(js_namespace = stackHost, js_name = remapUv)]
    fn host_remap_uv(id: u32, axis: &str, original_size: f32, new_size: f32, delta: f32);

    #[wasm_bindgen(js_namespace = stackHost, js_name = render)]
    fn host_render(camera_x: f32, camera_y: f32, camera_z: f32);
}

/// Whether the page has installed `stackHost`
pub fn host_available() -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("stackHost")).unwrap_or(false)
}

/// Scene drawn by the page's renderer
#[derive(Debug, Default)]
pub struct JsScene {
    dirty: bool,
}

impl JsScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw one frame from `camera` if the session asked for it
    pub fn present(&mut self, camera: Vec3) {
        if std::mem::take(&mut self.dirty) {
            host_render(camera.x, camera.y, camera.z);
        }
    }
}

impl Scene for JsScene {
    fn add_visual(&mut self, shape: BoxShape, position: Vec3) -> VisualHandle {
        VisualHandle(host_add_box(
            shape.width,
            shape.height,
            shape.depth,
            position.x,
            position.y,
            position.z,
        ))
    }

    fn remove_visual(&mut self, handle: VisualHandle) {
        host_remove_box(handle.0);
    }

    fn set_transform(&mut self, handle: VisualHandle, transform: Transform) {
        let Transform {
            translation: t,
            rotation: q,
            scale: s,
        } = transform;
        host_set_transform(handle.0, t.x, t.y, t.z, q.x, q.y, q.z, q.w, s.x, s.y, s.z);
    }

    fn remap_surface_coordinates(
        &mut self,
        handle: VisualHandle,
        axis: Axis,
        original_size: f32,
        new_size: f32,
        delta: f32,
    ) {
        let axis = match axis {
            Axis::X => "x",
            Axis::Z => "z",
        };
        host_remap_uv(handle.0, axis, original_size, new_size, delta);
    }

    fn request_redraw(&mut self) {
        self.dirty = true;
    }
}

// === DOM helpers ===

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

pub fn html_element(id: &str) -> Option<HtmlElement> {
    document()?.get_element_by_id(id)?.dyn_into().ok()
}

pub fn set_opacity(id: &str, opacity: f32) {
    if let Some(el) = html_element(id) {
        let _ = el.style().set_property("opacity", &opacity.to_string());
    }
}

pub fn opacity(id: &str) -> f32 {
    html_element(id)
        .and_then(|el| el.style().get_property_value("opacity").ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0.0)
}

pub fn set_style(id: &str, property: &str, value: &str) {
    if let Some(el) = html_element(id) {
        let _ = el.style().set_property(property, value);
    }
}

pub fn set_text(id: &str, text: &str) {
    if let Some(el) = html_element(id) {
        el.set_text_content(Some(text));
    }
}

/// Resolve after `ms` milliseconds
pub async fn sleep_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        }
    });
    let _ = JsFuture::from(promise).await;
}
