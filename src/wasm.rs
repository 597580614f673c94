use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn generate_source(block_json: &str) -> Result<String, JsValue> {
    generate_source_with_options(block_json, true)
}

#[wasm_bindgen]
pub fn generate_source_with_options(block_json: &str, trace: bool) -> Result<String, JsValue> {
    crate::generate_source(block_json, crate::codegen::EmitOptions { trace })
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
