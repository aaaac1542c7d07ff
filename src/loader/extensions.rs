//! Raw glTF JSON lookups for material extensions and punctual lights.
//!
//! The typed document only surfaces the extensions its feature flags
//! enable, so extension data is read straight from the JSON tree.

use serde_json::Value;

pub const UNLIT: &str = "KHR_materials_unlit";
pub const SPECULAR_GLOSSINESS: &str = "KHR_materials_pbrSpecularGlossiness";
pub const CLEARCOAT: &str = "KHR_materials_clearcoat";
pub const SHEEN: &str = "KHR_materials_sheen";
pub const TRANSMISSION: &str = "KHR_materials_transmission";
pub const IOR: &str = "KHR_materials_ior";
pub const VOLUME: &str = "KHR_materials_volume";
pub const TEXTURE_TRANSFORM: &str = "KHR_texture_transform";
pub const LIGHTS_PUNCTUAL: &str = "KHR_lights_punctual";

/// Parsed JSON chunk of a glTF asset
#[derive(Debug)]
pub struct RawDocument {
    root: Value,
}

impl RawDocument {
    pub fn parse(json: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            root: serde_json::from_slice(json)?,
        })
    }

    fn material(&self, index: usize) -> Option<&Value> {
        self.root.get("materials")?.get(index)
    }

    /// Extension object `name` on material `index`
    pub fn material_extension(&self, index: Option<usize>, name: &str) -> Option<&Value> {
        self.material(index?)?.get("extensions")?.get(name)
    }

    /// Whether any texture reference of the material carries a texture transform
    pub fn uses_texture_transforms(&self, index: Option<usize>) -> bool {
        index
            .and_then(|i| self.material(i))
            .map_or(false, |m| mentions_key(m, TEXTURE_TRANSFORM))
    }

    /// Number of `KHR_lights_punctual` lights declared by the document
    pub fn light_count(&self) -> usize {
        self.root
            .get("extensions")
            .and_then(|e| e.get(LIGHTS_PUNCTUAL))
            .and_then(|l| l.get("lights"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

fn mentions_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(k, v)| k == key || mentions_key(v, key)),
        Value::Array(items) => items.iter().any(|v| mentions_key(v, key)),
        _ => false,
    }
}

/// Texcoord index of texture-info `field`, if the texture is present.
/// Indices that do not fit a `u8` saturate and are rejected later.
pub fn texture_uv(extension: &Value, field: &str) -> Option<u8> {
    let info = extension.get(field)?;
    info.get("index")?;
    let tex_coord = info.get("texCoord").and_then(Value::as_u64).unwrap_or(0);
    Some(u8::try_from(tex_coord).unwrap_or(u8::MAX))
}

pub fn float(extension: Option<&Value>, field: &str, default: f32) -> f32 {
    extension
        .and_then(|e| e.get(field))
        .and_then(Value::as_f64)
        .map_or(default, |v| v as f32)
}

pub fn float3(extension: Option<&Value>, field: &str, default: [f32; 3]) -> [f32; 3] {
    floats::<3>(extension.and_then(|e| e.get(field))).unwrap_or(default)
}

pub fn float4(extension: Option<&Value>, field: &str, default: [f32; 4]) -> [f32; 4] {
    floats::<4>(extension.and_then(|e| e.get(field))).unwrap_or(default)
}

/// Read a fixed-length numeric JSON array
pub fn floats<const N: usize>(value: Option<&Value>) -> Option<[f32; N]> {
    let items = value?.as_array()?;
    if items.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64()? as f32;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "materials": [
            {"extensions": {"KHR_materials_clearcoat": {
                "clearcoatFactor": 0.25,
                "clearcoatTexture": {"index": 0, "texCoord": 1}
            }}},
            {"pbrMetallicRoughness": {"baseColorTexture": {
                "index": 0,
                "extensions": {"KHR_texture_transform": {"scale": [2, 2]}}
            }}}
        ],
        "extensions": {"KHR_lights_punctual": {"lights": [{"type": "point"}, {"type": "spot"}]}}
    }"#;

    #[test]
    fn test_material_extension_lookup() {
        let doc = RawDocument::parse(DOC.as_bytes()).unwrap();
        let coat = doc.material_extension(Some(0), CLEARCOAT);
        assert!(coat.is_some());
        assert_eq!(float(coat, "clearcoatFactor", 0.0), 0.25);
        assert_eq!(texture_uv(coat.unwrap(), "clearcoatTexture"), Some(1));
        assert_eq!(texture_uv(coat.unwrap(), "clearcoatNormalTexture"), None);

        assert!(doc.material_extension(Some(1), CLEARCOAT).is_none());
        assert!(doc.material_extension(None, CLEARCOAT).is_none());
    }

    #[test]
    fn test_texture_transform_detection() {
        let doc = RawDocument::parse(DOC.as_bytes()).unwrap();
        assert!(!doc.uses_texture_transforms(Some(0)));
        assert!(doc.uses_texture_transforms(Some(1)));
        assert!(!doc.uses_texture_transforms(None));
    }

    #[test]
    fn test_light_count() {
        let doc = RawDocument::parse(DOC.as_bytes()).unwrap();
        assert_eq!(doc.light_count(), 2);
        assert_eq!(RawDocument::parse(b"{}").unwrap().light_count(), 0);
    }

    #[test]
    fn test_floats_require_exact_length() {
        let value: Value = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(floats::<3>(Some(&value)), Some([1.0, 2.0, 3.0]));
        assert_eq!(floats::<4>(Some(&value)), None);
    }
}
