//! WebAssembly bindings for the element hiding engine

use wasm_bindgen::prelude::*;

use eh_core::{ElemHide, ElemHideStyleSheet, StyleSheetOptions};
use eh_parser::{parse_filter, parse_filter_list, ElemHideRule};

/// Element hiding engine owned by the extension host.
#[wasm_bindgen]
pub struct ElemHideEngine {
    engine: ElemHide,
}

impl Default for ElemHideEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ElemHideEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: ElemHide::new(),
        }
    }

    /// Load every element hiding rule of a filter list.
    /// Returns the number of rules that were not already known.
    pub fn load_filter_list(&mut self, text: &str) -> u32 {
        let list = parse_filter_list(text);
        if list.invalid > 0 {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "elemhide: skipped {} invalid rules",
                list.invalid
            )));
        }
        list.apply_to(&mut self.engine) as u32
    }

    /// Add a single filter or exception line.
    pub fn add_filter(&mut self, line: &str) -> Result<bool, JsValue> {
        match parse_line(line)? {
            ElemHideRule::Filter(filter) => Ok(self.engine.add(filter)),
            ElemHideRule::Exception(exception) => Ok(self.engine.add_exception(exception)),
        }
    }

    /// Remove a single filter or exception line.
    pub fn remove_filter(&mut self, line: &str) -> Result<bool, JsValue> {
        match parse_line(line)? {
            ElemHideRule::Filter(filter) => Ok(self.engine.remove(&filter)),
            ElemHideRule::Exception(exception) => Ok(self.engine.remove_exception(&exception)),
        }
    }

    /// Remove all filters and exceptions.
    pub fn clear(&mut self) {
        self.engine.clear();
        self.engine.clear_exceptions();
    }

    pub fn filter_count(&self) -> u32 {
        self.engine.filter_count() as u32
    }

    /// Generate the style sheet for a document domain.
    /// Returns `{code, selectors, exceptions}`; unrequested lists are `null`.
    pub fn generate_style_sheet(
        &mut self,
        domain: &str,
        specific_only: bool,
        include_selectors: bool,
        include_exceptions: bool,
    ) -> JsValue {
        let mut options = StyleSheetOptions::empty();
        options.set(StyleSheetOptions::SPECIFIC_ONLY, specific_only);
        options.set(StyleSheetOptions::INCLUDE_SELECTORS, include_selectors);
        options.set(StyleSheetOptions::INCLUDE_EXCEPTIONS, include_exceptions);

        let result = self.engine.generate_style_sheet_for_domain(domain, options);
        style_sheet_to_js(&result)
    }
}

fn parse_line(line: &str) -> Result<ElemHideRule, JsValue> {
    match parse_filter(line) {
        Ok(Some(rule)) => Ok(rule),
        Ok(None) => Err(JsValue::from_str("Not an element hiding rule")),
        Err(e) => Err(JsValue::from_str(&format!("Invalid rule: {}", e))),
    }
}

fn style_sheet_to_js(result: &ElemHideStyleSheet) -> JsValue {
    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"code".into(), &JsValue::from_str(&result.code));

    let selectors = match &result.selectors {
        Some(selectors) => {
            let array = js_sys::Array::new();
            for selector in selectors {
                array.push(&JsValue::from_str(selector));
            }
            array.into()
        }
        None => JsValue::NULL,
    };
    let _ = js_sys::Reflect::set(&js_result, &"selectors".into(), &selectors);

    let exceptions = match &result.exceptions {
        Some(exceptions) => {
            let array = js_sys::Array::new();
            for exception in exceptions {
                array.push(&JsValue::from_str(&exception.text));
            }
            array.into()
        }
        None => JsValue::NULL,
    };
    let _ = js_sys::Reflect::set(&js_result, &"exceptions".into(), &exceptions);

    js_result.into()
}
