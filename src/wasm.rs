use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn generate_from_json(program_json: &str) -> Result<String, JsValue> {
    crate::generate_from_json_str(program_json).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

#[wasm_bindgen]
pub fn block_definitions() -> Result<String, JsValue> {
    crate::blocks::definitions_json()
        .and_then(|defs| Ok(serde_json::to_string(&defs)?))
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
