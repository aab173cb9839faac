//! Step catalogue
//!
//! Every step the CLI can create, and the `parsedStep` body Virtuoso expects
//! for it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

/// Timeout used by `wait element` when none is given (milliseconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 20_000;

/// Distance scrolled by `scroll-up` / `scroll-down` (pixels)
pub const SCROLL_STEP_PX: i32 = 1_000;

/// Polling interval sent with time waits (milliseconds)
const WAIT_POLL_MS: u64 = 100;

/// Optional attributes for a created cookie
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

/// A single step to create in a checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    // Assertions
    AssertExists { element: String },
    AssertNotExists { element: String },
    AssertEquals { element: String, value: String },
    AssertNotEquals { element: String, value: String },
    AssertGreaterThan { element: String, value: String },
    AssertGreaterThanOrEqual { element: String, value: String },
    AssertLessThan { element: String, value: String },
    AssertLessThanOrEqual { element: String, value: String },
    AssertMatches { element: String, pattern: String },
    AssertChecked { element: String },
    AssertSelected { element: String },
    AssertVariable { name: String, expected: String },

    // Interaction
    Click {
        selector: String,
        variable: Option<String>,
        position_type: Option<String>,
        element_type: Option<String>,
    },
    DoubleClick { selector: String },
    RightClick { selector: String },
    Hover { selector: String },
    Write {
        selector: String,
        text: String,
        variable: Option<String>,
    },
    Key { key: String, target: Option<String> },

    // Navigation
    Navigate { url: String, new_tab: bool },
    ScrollTop,
    ScrollBottom,
    ScrollElement { selector: String },
    ScrollPosition { x: i32, y: i32 },
    ScrollBy { x: i32, y: i32 },
    ScrollUp,
    ScrollDown,

    // Waits
    WaitElement { selector: String, timeout_ms: u64 },
    WaitElementNotVisible { selector: String, timeout_ms: u64 },
    WaitTime { ms: u64 },

    // Data
    StoreElementText { selector: String, variable: String },
    StoreLiteral { value: String, variable: String },
    StoreAttribute {
        selector: String,
        attribute: String,
        variable: String,
    },
    CookieCreate {
        name: String,
        value: String,
        options: CookieOptions,
    },
    CookieDelete { name: String },
    CookieClearAll,

    // Dialogs
    DismissAlert,
    DismissConfirm { accept: bool },
    DismissPrompt,
    DismissPromptWithText { text: String },

    // Window
    SwitchIframe { selector: String },
    SwitchParentFrame,
    SwitchNextTab,
    SwitchPrevTab,
    SwitchTabIndex { index: u32 },
    Resize { width: u32, height: u32 },
    Maximize,

    // Mouse
    MouseDown { selector: String },
    MouseUp { selector: String },
    MouseEnter { selector: String },
    MouseMove { selector: String },
    MouseMoveBy { dx: i32, dy: i32 },
    MouseMoveTo { x: i32, y: i32 },

    // Select
    PickText { selector: String, text: String },
    PickValue { selector: String, value: String },
    PickIndex { selector: String, index: u32 },
    PickLast { selector: String },

    // File
    Upload { selector: String, path: String },
    UploadUrl { selector: String, url: String },

    // Misc
    Comment { text: String },
    Execute { script: String },
}

/// Selector target in Virtuoso's GUESS form. The clue object is itself
/// JSON-encoded into the selector value.
pub fn guess_target(clue: Value) -> Value {
    json!({
        "selectors": [
            { "type": "GUESS", "value": clue.to_string() }
        ]
    })
}

fn clue(selector: &str) -> Value {
    guess_target(json!({ "clue": selector }))
}

fn targeted(action: &str, selector: &str, value: impl Into<Value>, meta: Value) -> Value {
    json!({
        "action": action,
        "target": clue(selector),
        "value": value.into(),
        "meta": meta,
    })
}

fn untargeted(action: &str, value: impl Into<Value>, meta: Value) -> Value {
    json!({
        "action": action,
        "value": value.into(),
        "meta": meta,
    })
}

fn empty_meta() -> Value {
    Value::Object(Map::new())
}

impl StepAction {
    /// Virtuoso action name, e.g. `ASSERT_EXISTS`
    pub fn step_type(&self) -> &'static str {
        use StepAction::*;
        match self {
            AssertExists { .. } => "ASSERT_EXISTS",
            AssertNotExists { .. } => "ASSERT_NOT_EXISTS",
            AssertEquals { .. } => "ASSERT_EQUALS",
            AssertNotEquals { .. } => "ASSERT_NOT_EQUALS",
            AssertGreaterThan { .. } => "ASSERT_GREATER_THAN",
            AssertGreaterThanOrEqual { .. } => "ASSERT_GREATER_THAN_OR_EQUAL",
            AssertLessThan { .. } => "ASSERT_LESS_THAN",
            AssertLessThanOrEqual { .. } => "ASSERT_LESS_THAN_OR_EQUAL",
            AssertMatches { .. } => "ASSERT_MATCHES",
            AssertChecked { .. } => "ASSERT_CHECKED",
            AssertSelected { .. } => "ASSERT_SELECTED",
            AssertVariable { .. } => "ASSERT_VARIABLE",
            Click { .. } => "CLICK",
            DoubleClick { .. } | RightClick { .. } | Hover { .. } => "MOUSE",
            MouseDown { .. } | MouseUp { .. } | MouseEnter { .. } | MouseMove { .. } => "MOUSE",
            MouseMoveBy { .. } | MouseMoveTo { .. } => "MOUSE",
            Write { .. } => "WRITE",
            Key { .. } => "KEY",
            Navigate { .. } => "NAVIGATE",
            ScrollTop | ScrollBottom | ScrollElement { .. } | ScrollPosition { .. }
            | ScrollBy { .. } | ScrollUp | ScrollDown => "SCROLL",
            WaitElement { .. } | WaitElementNotVisible { .. } | WaitTime { .. } => "WAIT",
            StoreElementText { .. } | StoreLiteral { .. } | StoreAttribute { .. } => "STORE",
            CookieCreate { .. } | CookieDelete { .. } | CookieClearAll => "ENVIRONMENT",
            DismissAlert | DismissConfirm { .. } | DismissPrompt | DismissPromptWithText { .. } => {
                "DISMISS"
            }
            SwitchIframe { .. } | SwitchParentFrame | SwitchNextTab | SwitchPrevTab
            | SwitchTabIndex { .. } => "SWITCH",
            Resize { .. } | Maximize => "WINDOW",
            PickText { .. } | PickValue { .. } | PickIndex { .. } | PickLast { .. } => "PICK",
            Upload { .. } | UploadUrl { .. } => "UPLOAD",
            Comment { .. } => "COMMENT",
            Execute { .. } => "EXECUTE",
        }
    }

    /// The `parsedStep` request body
    pub fn parsed_step(&self) -> Value {
        use StepAction::*;
        let action = self.step_type();
        match self {
            AssertExists { element } => {
                targeted(action, element, format!("see \"{}\"", element), empty_meta())
            }
            AssertNotExists { element } => targeted(
                action,
                element,
                format!("do not see \"{}\"", element),
                empty_meta(),
            ),
            AssertEquals { element, value } => targeted(
                action,
                element,
                format!("expect {} to have text \"{}\"", element, value),
                empty_meta(),
            ),
            AssertNotEquals { element, value }
            | AssertGreaterThan { element, value }
            | AssertGreaterThanOrEqual { element, value }
            | AssertLessThan { element, value }
            | AssertLessThanOrEqual { element, value } => {
                targeted(action, element, value.as_str(), empty_meta())
            }
            AssertMatches { element, pattern } => {
                targeted(action, element, pattern.as_str(), empty_meta())
            }
            AssertChecked { element } => targeted(
                action,
                element,
                format!("see {} is checked", element),
                empty_meta(),
            ),
            AssertSelected { element } => targeted(action, element, "", empty_meta()),
            AssertVariable { name, expected } => json!({
                "action": action,
                "variable": name,
                "value": expected,
                "meta": { "kind": "ASSERT_VARIABLE", "type": "EQUALS" },
            }),

            Click {
                selector,
                variable,
                position_type,
                element_type,
            } => {
                let mut clue = Map::new();
                clue.insert("clue".into(), Value::from(selector.as_str()));
                if let Some(variable) = variable {
                    clue.insert("variable".into(), Value::from(variable.as_str()));
                }
                if let Some(position_type) = position_type {
                    clue.insert("position".into(), Value::from(position_type.as_str()));
                }
                if let Some(element_type) = element_type {
                    clue.insert("elementType".into(), Value::from(element_type.as_str()));
                }
                json!({
                    "action": action,
                    "target": guess_target(Value::Object(clue)),
                    "value": "",
                    "meta": {},
                })
            }
            DoubleClick { selector } => mouse_on(selector, "DOUBLE_CLICK"),
            RightClick { selector } => mouse_on(selector, "RIGHT_CLICK"),
            Hover { selector } => mouse_on(selector, "OVER"),
            Write {
                selector,
                text,
                variable,
            } => {
                let mut step = targeted(action, selector, text.as_str(), empty_meta());
                if let (Some(variable), Some(obj)) = (variable, step.as_object_mut()) {
                    obj.insert("variable".into(), Value::from(variable.as_str()));
                }
                step
            }
            Key { key, target } => match target {
                Some(selector) => targeted(action, selector, key.as_str(), empty_meta()),
                None => untargeted(action, key.as_str(), empty_meta()),
            },

            Navigate { url, new_tab } => {
                let meta = if *new_tab {
                    json!({ "useNewTab": true })
                } else {
                    empty_meta()
                };
                untargeted(action, url.as_str(), meta)
            }
            ScrollTop => untargeted(action, "", json!({ "type": "TOP" })),
            ScrollBottom => untargeted(action, "", json!({ "type": "BOTTOM" })),
            ScrollElement { selector } => {
                targeted(action, selector, "", json!({ "type": "ELEMENT" }))
            }
            ScrollPosition { x, y } => {
                untargeted(action, "", json!({ "type": "POSITION", "x": x, "y": y }))
            }
            ScrollBy { x, y } => untargeted(action, "", json!({ "type": "OFFSET", "x": x, "y": y })),
            ScrollUp => untargeted(
                action,
                "",
                json!({ "type": "OFFSET", "x": 0, "y": -SCROLL_STEP_PX }),
            ),
            ScrollDown => untargeted(
                action,
                "",
                json!({ "type": "OFFSET", "x": 0, "y": SCROLL_STEP_PX }),
            ),

            WaitElement {
                selector,
                timeout_ms,
            } => targeted(action, selector, timeout_ms.to_string(), empty_meta()),
            WaitElementNotVisible {
                selector,
                timeout_ms,
            } => targeted(
                action,
                selector,
                "",
                json!({ "type": "ELEMENT_NOT_VISIBLE", "timeoutMs": timeout_ms }),
            ),
            WaitTime { ms } => untargeted(
                action,
                ms.to_string(),
                json!({ "kind": "WAIT", "type": "TIME", "duration": ms, "poll": WAIT_POLL_MS }),
            ),

            StoreElementText { selector, variable } => {
                let mut step = targeted(action, selector, "", empty_meta());
                set_variable(&mut step, variable);
                step
            }
            StoreLiteral { value, variable } => {
                let mut step = untargeted(action, value.as_str(), empty_meta());
                set_variable(&mut step, variable);
                step
            }
            StoreAttribute {
                selector,
                attribute,
                variable,
            } => {
                let mut step = targeted(
                    action,
                    selector,
                    "",
                    json!({ "attribute": attribute }),
                );
                set_variable(&mut step, variable);
                step
            }
            CookieCreate {
                name,
                value,
                options,
            } => {
                let mut meta = Map::new();
                meta.insert("type".into(), Value::from("ADD"));
                meta.insert("name".into(), Value::from(name.as_str()));
                if let Some(domain) = &options.domain {
                    meta.insert("domain".into(), Value::from(domain.as_str()));
                }
                if let Some(path) = &options.path {
                    meta.insert("path".into(), Value::from(path.as_str()));
                }
                if options.secure {
                    meta.insert("secure".into(), Value::Bool(true));
                }
                if options.http_only {
                    meta.insert("httpOnly".into(), Value::Bool(true));
                }
                untargeted(action, value.as_str(), Value::Object(meta))
            }
            CookieDelete { name } => {
                untargeted(action, "", json!({ "type": "DELETE", "name": name }))
            }
            CookieClearAll => untargeted(action, "", json!({ "type": "CLEAR" })),

            DismissAlert => untargeted(action, "", json!({ "type": "ALERT" })),
            DismissConfirm { accept } => {
                let choice = if *accept { "OK" } else { "CANCEL" };
                untargeted(action, "", json!({ "type": "CONFIRM", "action": choice }))
            }
            DismissPrompt => untargeted(action, "", json!({ "type": "PROMPT", "action": "CANCEL" })),
            DismissPromptWithText { text } => untargeted(
                action,
                text.as_str(),
                json!({ "type": "PROMPT", "action": "OK" }),
            ),

            SwitchIframe { selector } => json!({
                "action": action,
                "target": clue(selector),
                "meta": { "type": "FRAME_BY_ELEMENT" },
            }),
            SwitchParentFrame => json!({ "action": action, "meta": { "type": "PARENT_FRAME" } }),
            SwitchNextTab => json!({ "action": action, "meta": { "type": "NEXT_TAB" } }),
            SwitchPrevTab => json!({ "action": action, "meta": { "type": "PREV_TAB" } }),
            SwitchTabIndex { index } => {
                json!({ "action": action, "meta": { "type": "TAB", "index": index } })
            }
            Resize { width, height } => untargeted(
                action,
                "",
                json!({ "type": "RESIZE", "dimension": { "width": width, "height": height } }),
            ),
            Maximize => untargeted(action, "", json!({ "type": "MAXIMIZE" })),

            MouseDown { selector } => mouse_on(selector, "DOWN"),
            MouseUp { selector } => mouse_on(selector, "UP"),
            MouseEnter { selector } => mouse_on(selector, "ENTER"),
            MouseMove { selector } => mouse_on(selector, "MOVE"),
            MouseMoveBy { dx, dy } => {
                json!({ "action": action, "meta": { "action": "OFFSET", "x": dx, "y": dy } })
            }
            MouseMoveTo { x, y } => {
                json!({ "action": action, "meta": { "action": "MOVE", "x": x, "y": y } })
            }

            PickText { selector, text } => {
                targeted(action, selector, text.as_str(), json!({ "type": "VISIBLE_TEXT" }))
            }
            PickValue { selector, value } => {
                targeted(action, selector, value.as_str(), json!({ "type": "VALUE" }))
            }
            PickIndex { selector, index } => {
                targeted(action, selector, index.to_string(), json!({ "type": "INDEX" }))
            }
            PickLast { selector } => targeted(action, selector, "-1", json!({ "type": "INDEX" })),

            Upload { selector, path } => targeted(action, selector, path.as_str(), empty_meta()),
            UploadUrl { selector, url } => targeted(action, selector, url.as_str(), empty_meta()),

            Comment { text } => untargeted(action, text.as_str(), empty_meta()),
            Execute { script } => untargeted(
                action,
                script.as_str(),
                json!({ "explicit": true, "script": script }),
            ),
        }
    }

    /// Short human readable summary of the step
    pub fn describe(&self) -> String {
        use StepAction::*;
        match self {
            AssertExists { element } => format!("see \"{}\"", element),
            AssertNotExists { element } => format!("do not see \"{}\"", element),
            AssertEquals { element, value } => {
                format!("expect {} to have text \"{}\"", element, value)
            }
            AssertNotEquals { element, value } => format!("expect {} to not equal \"{}\"", element, value),
            AssertGreaterThan { element, value } => format!("expect {} > {}", element, value),
            AssertGreaterThanOrEqual { element, value } => format!("expect {} >= {}", element, value),
            AssertLessThan { element, value } => format!("expect {} < {}", element, value),
            AssertLessThanOrEqual { element, value } => format!("expect {} <= {}", element, value),
            AssertMatches { element, pattern } => {
                format!("expect {} to match /{}/", element, pattern)
            }
            AssertChecked { element } => format!("see {} is checked", element),
            AssertSelected { element } => format!("see {} is selected", element),
            AssertVariable { name, expected } => {
                format!("expect ${} to equal \"{}\"", name, expected)
            }
            Click { selector, variable, .. } => match variable {
                Some(variable) => format!("click on \"{}\" (variable ${})", selector, variable),
                None => format!("click on \"{}\"", selector),
            },
            DoubleClick { selector } => format!("double-click on \"{}\"", selector),
            RightClick { selector } => format!("right-click on \"{}\"", selector),
            Hover { selector } => format!("hover over \"{}\"", selector),
            Write { selector, text, .. } => format!("write \"{}\" in \"{}\"", text, selector),
            Key { key, target } => match target {
                Some(selector) => format!("press \"{}\" in \"{}\"", key, selector),
                None => format!("press \"{}\"", key),
            },
            Navigate { url, new_tab } => {
                if *new_tab {
                    format!("navigate to \"{}\" in a new tab", url)
                } else {
                    format!("navigate to \"{}\"", url)
                }
            }
            ScrollTop => "scroll to top".to_string(),
            ScrollBottom => "scroll to bottom".to_string(),
            ScrollElement { selector } => format!("scroll to \"{}\"", selector),
            ScrollPosition { x, y } => format!("scroll to position {},{}", x, y),
            ScrollBy { x, y } => format!("scroll by {},{}", x, y),
            ScrollUp => "scroll up".to_string(),
            ScrollDown => "scroll down".to_string(),
            WaitElement {
                selector,
                timeout_ms,
            } => format!("wait for \"{}\" (timeout {}ms)", selector, timeout_ms),
            WaitElementNotVisible {
                selector,
                timeout_ms,
            } => format!(
                "wait until \"{}\" is not visible (timeout {}ms)",
                selector, timeout_ms
            ),
            WaitTime { ms } => format!("wait {}ms", ms),
            StoreElementText { selector, variable } => {
                format!("store text of \"{}\" in ${}", selector, variable)
            }
            StoreLiteral { value, variable } => format!("store \"{}\" in ${}", value, variable),
            StoreAttribute {
                selector,
                attribute,
                variable,
            } => format!(
                "store attribute \"{}\" of \"{}\" in ${}",
                attribute, selector, variable
            ),
            CookieCreate { name, value, .. } => format!("add cookie \"{}\" = \"{}\"", name, value),
            CookieDelete { name } => format!("delete cookie \"{}\"", name),
            CookieClearAll => "clear all cookies".to_string(),
            DismissAlert => "dismiss alert".to_string(),
            DismissConfirm { accept } => {
                if *accept {
                    "accept confirm".to_string()
                } else {
                    "reject confirm".to_string()
                }
            }
            DismissPrompt => "dismiss prompt".to_string(),
            DismissPromptWithText { text } => format!("answer prompt with \"{}\"", text),
            SwitchIframe { selector } => format!("switch to iframe \"{}\"", selector),
            SwitchParentFrame => "switch to parent frame".to_string(),
            SwitchNextTab => "switch to next tab".to_string(),
            SwitchPrevTab => "switch to previous tab".to_string(),
            SwitchTabIndex { index } => format!("switch to tab {}", index),
            Resize { width, height } => format!("resize window to {}x{}", width, height),
            Maximize => "maximize window".to_string(),
            MouseDown { selector } => format!("mouse down on \"{}\"", selector),
            MouseUp { selector } => format!("mouse up on \"{}\"", selector),
            MouseEnter { selector } => format!("mouse enter \"{}\"", selector),
            MouseMove { selector } => format!("move mouse to \"{}\"", selector),
            MouseMoveBy { dx, dy } => format!("move mouse by {},{}", dx, dy),
            MouseMoveTo { x, y } => format!("move mouse to {},{}", x, y),
            PickText { selector, text } => format!("pick \"{}\" from \"{}\"", text, selector),
            PickValue { selector, value } => {
                format!("pick value \"{}\" from \"{}\"", value, selector)
            }
            PickIndex { selector, index } => format!("pick index {} from \"{}\"", index, selector),
            PickLast { selector } => format!("pick last option from \"{}\"", selector),
            Upload { selector, path } => format!("upload \"{}\" to \"{}\"", path, selector),
            UploadUrl { selector, url } => format!("upload \"{}\" to \"{}\"", url, selector),
            Comment { text } => format!("comment \"{}\"", text),
            Execute { script } => format!("execute \"{}\"", script),
        }
    }

    /// Required positional arguments as typed on the command line.
    ///
    /// Its length is where an optional trailing position would sit.
    pub fn args(&self) -> Vec<String> {
        use StepAction::*;
        let strs = |values: &[&String]| -> Vec<String> { values.iter().map(|v| v.to_string()).collect() };
        match self {
            AssertExists { element }
            | AssertNotExists { element }
            | AssertChecked { element }
            | AssertSelected { element } => strs(&[element]),
            AssertEquals { element, value }
            | AssertNotEquals { element, value }
            | AssertGreaterThan { element, value }
            | AssertGreaterThanOrEqual { element, value }
            | AssertLessThan { element, value }
            | AssertLessThanOrEqual { element, value } => strs(&[element, value]),
            AssertMatches { element, pattern } => strs(&[element, pattern]),
            AssertVariable { name, expected } => strs(&[name, expected]),
            Click { selector, .. }
            | DoubleClick { selector }
            | RightClick { selector }
            | Hover { selector }
            | ScrollElement { selector }
            | WaitElement { selector, .. }
            | WaitElementNotVisible { selector, .. }
            | SwitchIframe { selector }
            | MouseDown { selector }
            | MouseUp { selector }
            | MouseEnter { selector }
            | MouseMove { selector }
            | PickLast { selector } => strs(&[selector]),
            Write { selector, text, .. } => strs(&[selector, text]),
            Key { key, .. } => strs(&[key]),
            Navigate { url, .. } => strs(&[url]),
            ScrollTop | ScrollBottom | ScrollUp | ScrollDown => Vec::new(),
            ScrollPosition { x, y } | ScrollBy { x, y } => vec![format!("{},{}", x, y)],
            WaitTime { ms } => vec![ms.to_string()],
            StoreElementText { selector, variable } => strs(&[selector, variable]),
            StoreLiteral { value, variable } => strs(&[value, variable]),
            StoreAttribute {
                selector,
                attribute,
                variable,
            } => strs(&[selector, attribute, variable]),
            CookieCreate { name, value, .. } => strs(&[name, value]),
            CookieDelete { name } => strs(&[name]),
            CookieClearAll | DismissAlert | DismissConfirm { .. } | DismissPrompt => Vec::new(),
            DismissPromptWithText { text } => strs(&[text]),
            SwitchParentFrame | SwitchNextTab | SwitchPrevTab | Maximize => Vec::new(),
            SwitchTabIndex { index } => vec![index.to_string()],
            Resize { width, height } => vec![format!("{}x{}", width, height)],
            MouseMoveBy { dx, dy } => vec![dx.to_string(), dy.to_string()],
            MouseMoveTo { x, y } => vec![x.to_string(), y.to_string()],
            PickText { selector, text } => strs(&[selector, text]),
            PickValue { selector, value } => strs(&[selector, value]),
            PickIndex { selector, index } => vec![selector.clone(), index.to_string()],
            Upload { selector, path } => strs(&[selector, path]),
            UploadUrl { selector, url } => strs(&[selector, url]),
            Comment { text } => strs(&[text]),
            Execute { script } => strs(&[script]),
        }
    }

    /// Step specific fields shown alongside the standard output
    pub fn extra(&self) -> Map<String, Value> {
        use StepAction::*;
        let mut extra = Map::new();
        let mut put = |key: &str, value: Value| {
            extra.insert(key.to_string(), value);
        };
        match self {
            AssertExists { element }
            | AssertNotExists { element }
            | AssertChecked { element }
            | AssertSelected { element } => put("element", json!(element)),
            AssertEquals { element, value }
            | AssertNotEquals { element, value }
            | AssertGreaterThan { element, value }
            | AssertGreaterThanOrEqual { element, value }
            | AssertLessThan { element, value }
            | AssertLessThanOrEqual { element, value } => {
                put("element", json!(element));
                put("value", json!(value));
            }
            AssertMatches { element, pattern } => {
                put("element", json!(element));
                put("pattern", json!(pattern));
            }
            AssertVariable { name, expected } => {
                put("variable", json!(name));
                put("expected", json!(expected));
            }
            Click {
                selector,
                variable,
                position_type,
                element_type,
            } => {
                put("selector", json!(selector));
                if let Some(variable) = variable {
                    put("variable", json!(variable));
                }
                if let Some(position_type) = position_type {
                    put("position_type", json!(position_type));
                }
                if let Some(element_type) = element_type {
                    put("element_type", json!(element_type));
                }
            }
            Write {
                selector,
                text,
                variable,
            } => {
                put("selector", json!(selector));
                put("text", json!(text));
                if let Some(variable) = variable {
                    put("variable", json!(variable));
                }
            }
            Key { key, target } => {
                put("key", json!(key));
                if let Some(target) = target {
                    put("selector", json!(target));
                }
            }
            Navigate { url, new_tab } => {
                put("url", json!(url));
                put("new_tab", json!(new_tab));
            }
            ScrollPosition { x, y } | ScrollBy { x, y } | MouseMoveTo { x, y } => {
                put("x", json!(x));
                put("y", json!(y));
            }
            MouseMoveBy { dx, dy } => {
                put("x", json!(dx));
                put("y", json!(dy));
            }
            WaitElement {
                selector,
                timeout_ms,
            }
            | WaitElementNotVisible {
                selector,
                timeout_ms,
            } => {
                put("selector", json!(selector));
                put("timeout_ms", json!(timeout_ms));
            }
            WaitTime { ms } => put("duration_ms", json!(ms)),
            StoreElementText { selector, variable } => {
                put("selector", json!(selector));
                put("variable", json!(variable));
            }
            StoreLiteral { value, variable } => {
                put("value", json!(value));
                put("variable", json!(variable));
            }
            StoreAttribute {
                selector,
                attribute,
                variable,
            } => {
                put("selector", json!(selector));
                put("attribute", json!(attribute));
                put("variable", json!(variable));
            }
            CookieCreate { name, value, .. } => {
                put("name", json!(name));
                put("value", json!(value));
            }
            CookieDelete { name } => put("name", json!(name)),
            DismissConfirm { accept } => put("accept", json!(accept)),
            DismissPromptWithText { text } => put("text", json!(text)),
            SwitchTabIndex { index } => put("index", json!(index)),
            Resize { width, height } => {
                put("width", json!(width));
                put("height", json!(height));
            }
            PickText { selector, text } => {
                put("selector", json!(selector));
                put("text", json!(text));
            }
            PickValue { selector, value } => {
                put("selector", json!(selector));
                put("value", json!(value));
            }
            PickIndex { selector, index } => {
                put("selector", json!(selector));
                put("index", json!(index));
            }
            Upload { selector, path } => {
                put("selector", json!(selector));
                put("path", json!(path));
            }
            UploadUrl { selector, url } => {
                put("selector", json!(selector));
                put("url", json!(url));
            }
            Comment { text } => put("comment", json!(text)),
            Execute { script } => put("script", json!(script)),
            DoubleClick { selector }
            | RightClick { selector }
            | Hover { selector }
            | ScrollElement { selector }
            | SwitchIframe { selector }
            | MouseDown { selector }
            | MouseUp { selector }
            | MouseEnter { selector }
            | MouseMove { selector }
            | PickLast { selector } => put("selector", json!(selector)),
            ScrollTop | ScrollBottom | ScrollUp | ScrollDown | CookieClearAll | DismissAlert
            | DismissPrompt | SwitchParentFrame | SwitchNextTab | SwitchPrevTab | Maximize => {}
        }
        extra
    }

    /// Local argument checks, run before anything touches the session or network
    pub fn validate(&self) -> Result<()> {
        use StepAction::*;
        match self {
            AssertExists { element }
            | AssertNotExists { element }
            | AssertChecked { element }
            | AssertSelected { element } => selector_arg("element", element),
            AssertEquals { element, value }
            | AssertNotEquals { element, value }
            | AssertGreaterThan { element, value }
            | AssertGreaterThanOrEqual { element, value }
            | AssertLessThan { element, value }
            | AssertLessThanOrEqual { element, value } => {
                selector_arg("element", element)?;
                required("value", value)
            }
            AssertMatches { element, pattern } => {
                selector_arg("element", element)?;
                required("pattern", pattern)
            }
            AssertVariable { name, expected } => {
                required("variable name", name)?;
                required("expected value", expected)
            }
            Click {
                selector, variable, ..
            } => {
                selector_arg("selector", selector)?;
                optional("variable", variable.as_deref())
            }
            Write {
                selector,
                text,
                variable,
            } => {
                selector_arg("selector", selector)?;
                required("text", text)?;
                optional("variable", variable.as_deref())
            }
            Key { key, target } => {
                required("key", key)?;
                match target {
                    Some(target) => selector_arg("target", target),
                    None => Ok(()),
                }
            }
            Navigate { url, .. } => http_url("url", url),
            WaitElement {
                selector,
                timeout_ms,
            }
            | WaitElementNotVisible {
                selector,
                timeout_ms,
            } => {
                selector_arg("selector", selector)?;
                positive("timeout", *timeout_ms)
            }
            WaitTime { ms } => positive("wait time", *ms),
            StoreElementText { selector, variable } => {
                selector_arg("selector", selector)?;
                required("variable name", variable)
            }
            StoreLiteral { value, variable } => {
                required("value", value)?;
                required("variable name", variable)
            }
            StoreAttribute {
                selector,
                attribute,
                variable,
            } => {
                selector_arg("selector", selector)?;
                required("attribute", attribute)?;
                required("variable name", variable)
            }
            CookieCreate { name, options, .. } => {
                required("cookie name", name)?;
                optional("domain", options.domain.as_deref())?;
                optional("path", options.path.as_deref())
            }
            CookieDelete { name } => required("cookie name", name),
            DismissPromptWithText { text } => required("text", text),
            Resize { width, height } => {
                positive("width", u64::from(*width))?;
                positive("height", u64::from(*height))
            }
            PickText { selector, text } => {
                selector_arg("selector", selector)?;
                required("text", text)
            }
            PickValue { selector, value } => {
                selector_arg("selector", selector)?;
                required("value", value)
            }
            Upload { selector, path } => {
                selector_arg("selector", selector)?;
                required("file path", path)
            }
            UploadUrl { selector, url } => {
                selector_arg("selector", selector)?;
                http_url("url", url)
            }
            Comment { text } => required("comment", text),
            Execute { script } => required("script", script),
            DoubleClick { selector }
            | RightClick { selector }
            | Hover { selector }
            | ScrollElement { selector }
            | SwitchIframe { selector }
            | MouseDown { selector }
            | MouseUp { selector }
            | MouseEnter { selector }
            | MouseMove { selector }
            | PickIndex { selector, .. }
            | PickLast { selector } => selector_arg("selector", selector),
            ScrollTop | ScrollBottom | ScrollPosition { .. } | ScrollBy { .. } | ScrollUp
            | ScrollDown | CookieClearAll | DismissAlert | DismissConfirm { .. } | DismissPrompt
            | SwitchParentFrame | SwitchNextTab | SwitchPrevTab | SwitchTabIndex { .. }
            | Maximize | MouseMoveBy { .. } | MouseMoveTo { .. } => Ok(()),
        }
    }
}

fn mouse_on(selector: &str, action: &str) -> Value {
    json!({
        "action": "MOUSE",
        "target": clue(selector),
        "value": "",
        "meta": { "action": action },
    })
}

fn set_variable(step: &mut Value, variable: &str) {
    if let Some(obj) = step.as_object_mut() {
        obj.insert("variable".into(), Value::from(variable));
    }
}

fn required(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{} cannot be empty", name)));
    }
    Ok(())
}

fn optional(name: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) => required(name, value),
        None => Ok(()),
    }
}

fn selector_arg(name: &str, value: &str) -> Result<()> {
    required(name, value)?;
    if value.contains(['\n', '\r', '\t']) {
        return Err(Error::InvalidArgument(format!(
            "{} cannot contain newlines or tabs",
            name
        )));
    }
    Ok(())
}

fn http_url(name: &str, value: &str) -> Result<()> {
    required(name, value)?;
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(Error::InvalidArgument(format!(
            "{} must start with http:// or https://, got '{}'",
            name, value
        )));
    }
    Ok(())
}

fn positive(name: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidArgument(format!("{} must be greater than 0", name)));
    }
    Ok(())
}

/// Parse `X,Y` coordinates
pub fn parse_coordinates(raw: &str) -> Result<(i32, i32)> {
    let invalid = || {
        Error::InvalidArgument(format!(
            "invalid coordinates '{}': expected X,Y (e.g. 100,200)",
            raw
        ))
    };
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok((x, y))
}

/// Parse `WIDTHxHEIGHT` window dimensions
pub fn parse_dimensions(raw: &str) -> Result<(u32, u32)> {
    let invalid = || {
        Error::InvalidArgument(format!(
            "invalid dimensions '{}': expected WIDTHxHEIGHT (e.g. 1024x768)",
            raw
        ))
    };
    let lower = raw.trim().to_ascii_lowercase();
    let (width, height) = lower.split_once('x').ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector_value(step: &Value) -> Value {
        let raw = step["target"]["selectors"][0]["value"].as_str().unwrap();
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_assert_exists_payload() {
        let step = StepAction::AssertExists {
            element: "Login".into(),
        }
        .parsed_step();

        assert_eq!(step["action"], "ASSERT_EXISTS");
        assert_eq!(step["value"], "see \"Login\"");
        assert_eq!(step["target"]["selectors"][0]["type"], "GUESS");
        assert_eq!(selector_value(&step), json!({ "clue": "Login" }));
        assert_eq!(step["meta"], json!({}));
    }

    #[test]
    fn test_clue_escapes_quotes() {
        let step = StepAction::Click {
            selector: r#"button[name="go"]"#.into(),
            variable: None,
            position_type: None,
            element_type: None,
        }
        .parsed_step();

        let raw = step["target"]["selectors"][0]["value"].as_str().unwrap();
        assert_eq!(raw, r#"{"clue":"button[name=\"go\"]"}"#);
        assert_eq!(selector_value(&step)["clue"], r#"button[name="go"]"#);
    }

    #[test]
    fn test_click_details_extend_clue() {
        let step = StepAction::Click {
            selector: "Submit".into(),
            variable: Some("btn".into()),
            position_type: Some("TOP_LEFT".into()),
            element_type: Some("BUTTON".into()),
        }
        .parsed_step();

        assert_eq!(
            selector_value(&step),
            json!({ "clue": "Submit", "variable": "btn", "position": "TOP_LEFT", "elementType": "BUTTON" })
        );
    }

    #[test]
    fn test_value_formats_for_assertions() {
        let equals = StepAction::AssertEquals {
            element: "Title".into(),
            value: "Welcome".into(),
        };
        assert_eq!(equals.parsed_step()["value"], "expect Title to have text \"Welcome\"");

        let gt = StepAction::AssertGreaterThan {
            element: "Count".into(),
            value: "5".into(),
        };
        assert_eq!(gt.parsed_step()["value"], "5");
        assert_eq!(gt.step_type(), "ASSERT_GREATER_THAN");

        let var = StepAction::AssertVariable {
            name: "total".into(),
            expected: "10".into(),
        }
        .parsed_step();
        assert_eq!(var["variable"], "total");
        assert_eq!(var["meta"], json!({ "kind": "ASSERT_VARIABLE", "type": "EQUALS" }));
        assert!(var.get("target").is_none());
    }

    #[test]
    fn test_navigation_and_scroll_meta() {
        let nav = StepAction::Navigate {
            url: "https://example.com".into(),
            new_tab: true,
        }
        .parsed_step();
        assert_eq!(nav["value"], "https://example.com");
        assert_eq!(nav["meta"]["useNewTab"], true);

        let up = StepAction::ScrollUp.parsed_step();
        assert_eq!(up["meta"], json!({ "type": "OFFSET", "x": 0, "y": -1000 }));

        let pos = StepAction::ScrollPosition { x: 10, y: -20 }.parsed_step();
        assert_eq!(pos["meta"], json!({ "type": "POSITION", "x": 10, "y": -20 }));
    }

    #[test]
    fn test_wait_steps() {
        let element = StepAction::WaitElement {
            selector: "Spinner".into(),
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
        }
        .parsed_step();
        assert_eq!(element["value"], "20000");

        let gone = StepAction::WaitElementNotVisible {
            selector: "Spinner".into(),
            timeout_ms: 5000,
        }
        .parsed_step();
        assert_eq!(gone["value"], "");
        assert_eq!(
            gone["meta"],
            json!({ "type": "ELEMENT_NOT_VISIBLE", "timeoutMs": 5000 })
        );

        let time = StepAction::WaitTime { ms: 1500 }.parsed_step();
        assert_eq!(time["value"], "1500");
        assert_eq!(
            time["meta"],
            json!({ "kind": "WAIT", "type": "TIME", "duration": 1500, "poll": 100 })
        );
    }

    #[test]
    fn test_data_and_dialog_steps() {
        let store = StepAction::StoreAttribute {
            selector: "Link".into(),
            attribute: "href".into(),
            variable: "target".into(),
        }
        .parsed_step();
        assert_eq!(store["variable"], "target");
        assert_eq!(store["meta"], json!({ "attribute": "href" }));
        assert_eq!(store["value"], "");

        let cookie = StepAction::CookieCreate {
            name: "session".into(),
            value: "abc".into(),
            options: CookieOptions {
                domain: Some(".example.com".into()),
                secure: true,
                ..CookieOptions::default()
            },
        }
        .parsed_step();
        assert_eq!(cookie["value"], "abc");
        assert_eq!(
            cookie["meta"],
            json!({ "type": "ADD", "name": "session", "domain": ".example.com", "secure": true })
        );

        let reject = StepAction::DismissConfirm { accept: false }.parsed_step();
        assert_eq!(reject["meta"], json!({ "type": "CONFIRM", "action": "CANCEL" }));
    }

    #[test]
    fn test_window_mouse_and_select_steps() {
        let resize = StepAction::Resize {
            width: 1024,
            height: 768,
        }
        .parsed_step();
        assert_eq!(resize["meta"]["dimension"], json!({ "width": 1024, "height": 768 }));

        let hover = StepAction::Hover {
            selector: "Menu".into(),
        };
        assert_eq!(hover.step_type(), "MOUSE");
        assert_eq!(hover.parsed_step()["meta"]["action"], "OVER");

        let by = StepAction::MouseMoveBy { dx: -5, dy: 7 }.parsed_step();
        assert_eq!(by["meta"], json!({ "action": "OFFSET", "x": -5, "y": 7 }));

        let last = StepAction::PickLast {
            selector: "Country".into(),
        }
        .parsed_step();
        assert_eq!(last["value"], "-1");
        assert_eq!(last["meta"]["type"], "INDEX");

        let tab = StepAction::SwitchTabIndex { index: 2 }.parsed_step();
        assert_eq!(tab["meta"], json!({ "type": "TAB", "index": 2 }));
    }

    #[test]
    fn test_args_length_matches_positionals() {
        assert_eq!(StepAction::ScrollTop.args().len(), 0);
        assert_eq!(
            StepAction::AssertExists {
                element: "x".into()
            }
            .args(),
            vec!["x".to_string()]
        );
        assert_eq!(StepAction::MouseMoveTo { x: 1, y: 2 }.args().len(), 2);
        assert_eq!(
            StepAction::StoreAttribute {
                selector: "a".into(),
                attribute: "b".into(),
                variable: "c".into()
            }
            .args()
            .len(),
            3
        );
        assert_eq!(
            StepAction::ScrollBy { x: 3, y: 4 }.args(),
            vec!["3,4".to_string()]
        );
    }

    #[test]
    fn test_validation() {
        let blank = StepAction::AssertExists {
            element: "  ".into(),
        };
        assert!(matches!(blank.validate(), Err(Error::InvalidArgument(_))));

        let newline = StepAction::Hover {
            selector: "a\nb".into(),
        };
        assert!(newline.validate().is_err());

        let ftp = StepAction::Navigate {
            url: "ftp://example.com".into(),
            new_tab: false,
        };
        assert!(ftp.validate().is_err());

        assert!(StepAction::WaitTime { ms: 0 }.validate().is_err());
        assert!(StepAction::ScrollDown.validate().is_ok());
        assert!(StepAction::Comment {
            text: "checkout flow".into()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_coordinates("100,200").unwrap(), (100, 200));
        assert_eq!(parse_coordinates(" -5 , 7 ").unwrap(), (-5, 7));
        assert!(parse_coordinates("100").is_err());
        assert!(parse_coordinates("a,b").is_err());
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("1024x768").unwrap(), (1024, 768));
        assert_eq!(parse_dimensions("800X600").unwrap(), (800, 600));
        assert!(parse_dimensions("0x600").is_err());
        assert!(parse_dimensions("1024").is_err());
    }

    #[test]
    fn test_extra_fields() {
        let extra = StepAction::Navigate {
            url: "https://example.com".into(),
            new_tab: false,
        }
        .extra();
        assert_eq!(extra["url"], "https://example.com");
        assert_eq!(extra["new_tab"], false);
        assert!(StepAction::ScrollTop.extra().is_empty());
    }
}
