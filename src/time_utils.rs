use js_sys::Date;
use wasm_bindgen::JsValue;

const DAY: u64 = 86_400;

/// Подпись оси времени по UTC, тем грубее, чем шире видимый диапазон.
///
/// - span < 2 дней -> `HH:MM`
/// - span < ~1 года -> `DD.MM`
/// - иначе -> `MM.YYYY`
///
/// `time` и `visible_span_secs` в секундах.
pub fn format_time_label(time: u64, visible_span_secs: u64) -> String {
    let date = Date::new(&JsValue::from_f64(time as f64 * 1000.0));
    if visible_span_secs < 2 * DAY {
        format!("{:02}:{:02}", date.get_utc_hours(), date.get_utc_minutes())
    } else if visible_span_secs < 370 * DAY {
        format!("{:02}.{:02}", date.get_utc_date(), date.get_utc_month() + 1)
    } else {
        format!("{:02}.{}", date.get_utc_month() + 1, date.get_utc_full_year())
    }
}
