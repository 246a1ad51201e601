pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Render a backend timestamp for display. Falls back to the raw string when
/// the browser can't parse it.
pub(crate) fn format_date(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let d = js_sys::Date::new(&wasm_bindgen::JsValue::from_str(raw));
    if d.get_time().is_nan() {
        return raw.to_string();
    }

    d.to_locale_date_string("zh-CN", &wasm_bindgen::JsValue::UNDEFINED)
        .as_string()
        .unwrap_or_else(|| raw.to_string())
}

/// Render a wall-clock time for the autosave indicator.
pub(crate) fn format_time_ms(ms: i64) -> String {
    let d = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(ms as f64));
    d.to_locale_time_string("zh-CN")
        .as_string()
        .unwrap_or_default()
}
