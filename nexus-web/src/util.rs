use anyhow::anyhow;
use gloo_storage::{LocalStorage, Storage};
use nexus_client::{api::Error, SessionStore};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Blocking browser alert
pub fn alert(msg: &str) {
    let res = web_sys::window().map(|w| w.alert_with_message(msg));
    if !matches!(res, Some(Ok(()))) {
        tracing::error!(%msg, "failed showing alert");
    }
}

/// Blocking browser confirmation, `false` if it could not be shown
pub fn confirm(msg: &str) -> bool {
    match web_sys::window().map(|w| w.confirm_with_message(msg)) {
        Some(Ok(answer)) => answer,
        _ => {
            tracing::error!(%msg, "failed showing confirmation dialog");
            false
        }
    }
}

/// Value of the `<input>`, `<textarea>` or `<select>` an event fired on
pub fn event_value(e: &web_sys::Event) -> String {
    let Some(target) = e.target() else {
        return String::new();
    };
    if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
        return input.value();
    }
    if let Some(area) = target.dyn_ref::<web_sys::HtmlTextAreaElement>() {
        return area.value();
    }
    if let Some(select) = target.dyn_ref::<web_sys::HtmlSelectElement>() {
        return select.value();
    }
    String::new()
}

pub fn event_checked(e: &web_sys::Event) -> bool {
    e.target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        .map(|i| i.checked())
        .unwrap_or(false)
}

/// First file picked in the `<input type="file">` an event fired on
pub fn event_file(e: &web_sys::Event) -> Option<web_sys::File> {
    e.target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        .and_then(|i| i.files())
        .and_then(|f| f.get(0))
}

pub async fn read_file(file: &web_sys::File) -> Result<Vec<u8>, Error> {
    let buf = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| Error::Validation(format!("Failed reading file: {e:?}")))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

pub fn push_history(path: &str) {
    let res = web_sys::window()
        .ok_or(wasm_bindgen::JsValue::NULL)
        .and_then(|w| w.history())
        .and_then(|h| h.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(path)));
    if let Err(e) = res {
        tracing::error!(%path, error = ?e, "failed pushing history state");
    }
}

/// Session persistence in the browser's local storage
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageStore;

impl SessionStore for LocalStorageStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| anyhow!("reading {key:?} from local storage: {e:?}"))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| anyhow!("writing {key:?} to local storage: {e:?}"))
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        LocalStorage::delete(key);
        Ok(())
    }
}

pub fn fmt_time(t: Option<nexus_client::api::Time>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| String::from("Unknown date"))
}
