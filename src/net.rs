//! Transport boundary to the external generative service.
//!
//! The service itself is opaque: the hosting page provides a
//! `window.conceptOracle(prompt)` hook returning a `Promise<string>`. This
//! module bridges that Promise into the polled, tick-driven world the game
//! logic lives in — [`Transport::submit`] fires the request, the settled
//! result lands in an inbox, and the oracle client picks it up on a later
//! tick via [`Transport::take_response`].

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

/// Name of the page-provided generation hook.
const ORACLE_HOOK: &str = "conceptOracle";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// Quota / 429 class failure — the one condition worth retrying.
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Everything else: network down, hook missing, service error.
    #[error("request failed: {0}")]
    Failed(String),
}

/// One-shot prompt delivery with asynchronous completion.
///
/// Implementations must deliver at most one response per submitted id and
/// must not block; `take_response` is polled every tick.
pub trait Transport {
    fn submit(&mut self, id: u64, prompt: &str);
    fn take_response(&mut self, id: u64) -> Option<Result<String, TransportError>>;
}

type Inbox = Rc<RefCell<Vec<(u64, Result<String, TransportError>)>>>;

/// Classify a JS rejection into the retryable/terminal split.
/// Markers follow the service's quota error surface.
fn classify_rejection(msg: String) -> TransportError {
    if msg.contains("429") || msg.contains("quota") || msg.contains("RESOURCE_EXHAUSTED") {
        TransportError::RateLimited(msg)
    } else {
        TransportError::Failed(msg)
    }
}

fn js_error_message(v: &JsValue) -> String {
    v.as_string()
        .or_else(|| {
            js_sys::Reflect::get(v, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{v:?}"))
}

/// Browser implementation calling the page hook.
pub struct BrowserTransport {
    inbox: Inbox,
}

impl BrowserTransport {
    pub fn new() -> Self {
        Self {
            inbox: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn hook() -> Option<js_sys::Function> {
        let window = web_sys::window()?;
        js_sys::Reflect::get(&window, &JsValue::from_str(ORACLE_HOOK))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()
    }
}

impl Transport for BrowserTransport {
    fn submit(&mut self, id: u64, prompt: &str) {
        let hook = match Self::hook() {
            Some(f) => f,
            None => {
                web_sys::console::warn_1(&format!("{ORACLE_HOOK} hook not installed").into());
                self.inbox
                    .borrow_mut()
                    .push((id, Err(TransportError::Failed("oracle hook missing".into()))));
                return;
            }
        };

        let promise: js_sys::Promise =
            match hook.call1(&JsValue::NULL, &JsValue::from_str(prompt)) {
                Ok(v) => match v.dyn_into() {
                    Ok(p) => p,
                    Err(_) => {
                        self.inbox.borrow_mut().push((
                            id,
                            Err(TransportError::Failed("hook did not return a Promise".into())),
                        ));
                        return;
                    }
                },
                Err(e) => {
                    self.inbox
                        .borrow_mut()
                        .push((id, Err(classify_rejection(js_error_message(&e)))));
                    return;
                }
            };

        let inbox = self.inbox.clone();
        let on_ok = Closure::wrap(Box::new(move |v: JsValue| {
            inbox
                .borrow_mut()
                .push((id, Ok(v.as_string().unwrap_or_default())));
        }) as Box<dyn FnMut(JsValue)>);

        let inbox = self.inbox.clone();
        let on_err = Closure::wrap(Box::new(move |e: JsValue| {
            inbox
                .borrow_mut()
                .push((id, Err(classify_rejection(js_error_message(&e)))));
        }) as Box<dyn FnMut(JsValue)>);

        let _ = promise.then2(&on_ok, &on_err);
        // Ownership moves to the JS side until the Promise settles.
        on_ok.forget();
        on_err.forget();
    }

    fn take_response(&mut self, id: u64) -> Option<Result<String, TransportError>> {
        let mut inbox = self.inbox.borrow_mut();
        let pos = inbox.iter().position(|(rid, _)| *rid == id)?;
        Some(inbox.swap_remove(pos).1)
    }
}

/// Scripted transport for tests: responses are consumed in submit order, or
/// delivered by hand with [`ScriptedTransport::deliver`].
#[cfg(test)]
pub struct ScriptedTransport {
    script: std::collections::VecDeque<Result<String, TransportError>>,
    ready: Vec<(u64, Result<String, TransportError>)>,
    pub submitted: Vec<(u64, String)>,
}

#[cfg(test)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            script: std::collections::VecDeque::new(),
            ready: Vec::new(),
            submitted: Vec::new(),
        }
    }

    pub fn scripted(responses: Vec<Result<String, TransportError>>) -> Self {
        let mut t = Self::new();
        t.script = responses.into();
        t
    }

    pub fn push_script(&mut self, response: Result<String, TransportError>) {
        self.script.push_back(response);
    }

    /// Deliver a response for a specific id, out of band.
    pub fn deliver(&mut self, id: u64, response: Result<String, TransportError>) {
        self.ready.push((id, response));
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.len()
    }
}

#[cfg(test)]
impl Transport for ScriptedTransport {
    fn submit(&mut self, id: u64, prompt: &str) {
        self.submitted.push((id, prompt.to_string()));
        if let Some(r) = self.script.pop_front() {
            self.ready.push((id, r));
        }
    }

    fn take_response(&mut self, id: u64) -> Option<Result<String, TransportError>> {
        let pos = self.ready.iter().position(|(rid, _)| *rid == id)?;
        Some(self.ready.swap_remove(pos).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_markers_classify_as_rate_limited() {
        assert!(matches!(
            classify_rejection("HTTP 429 Too Many Requests".into()),
            TransportError::RateLimited(_)
        ));
        assert!(matches!(
            classify_rejection("quota exceeded for model".into()),
            TransportError::RateLimited(_)
        ));
        assert!(matches!(
            classify_rejection("RESOURCE_EXHAUSTED".into()),
            TransportError::RateLimited(_)
        ));
    }

    #[test]
    fn other_rejections_are_terminal() {
        assert!(matches!(
            classify_rejection("network unreachable".into()),
            TransportError::Failed(_)
        ));
        assert!(matches!(
            classify_rejection("oracle hook missing".into()),
            TransportError::Failed(_)
        ));
    }

    #[test]
    fn scripted_transport_responds_in_submit_order() {
        let mut t = ScriptedTransport::scripted(vec![Ok("first".into()), Ok("second".into())]);
        t.submit(1, "a");
        t.submit(2, "b");
        assert_eq!(t.take_response(2), Some(Ok("second".into())));
        assert_eq!(t.take_response(1), Some(Ok("first".into())));
        assert_eq!(t.take_response(1), None);
    }

    #[test]
    fn scripted_transport_without_script_stays_pending() {
        let mut t = ScriptedTransport::new();
        t.submit(7, "x");
        assert_eq!(t.take_response(7), None);
        t.deliver(7, Ok("late".into()));
        assert_eq!(t.take_response(7), Some(Ok("late".into())));
    }
}
