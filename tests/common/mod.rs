//! Shared glTF fixtures for the integration tests.

#![allow(dead_code)]

/// Red triangle under a translated parent node. One textured material, one
/// external buffer and one external image.
pub const TRIANGLE_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [ { "nodes": [0] } ],
    "nodes": [
        { "name": "root", "children": [1], "translation": [10.0, 0.0, 0.0] },
        { "name": "triangle", "mesh": 0 }
    ],
    "meshes": [
        {
            "primitives": [
                { "attributes": { "POSITION": 0, "TEXCOORD_0": 1 }, "material": 0 }
            ]
        }
    ],
    "materials": [
        {
            "name": "red",
            "pbrMetallicRoughness": {
                "baseColorFactor": [1.0, 0.0, 0.0, 1.0],
                "metallicFactor": 0.25,
                "baseColorTexture": { "index": 0 }
            }
        }
    ],
    "textures": [ { "source": 0 } ],
    "images": [ { "uri": "albedo.png" } ],
    "accessors": [
        {
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [-1.0, -1.0, 0.0], "max": [1.0, 1.0, 0.0]
        },
        { "bufferView": 0, "byteOffset": 36, "componentType": 5126, "count": 3, "type": "VEC2" }
    ],
    "bufferViews": [ { "buffer": 0, "byteLength": 60 } ],
    "buffers": [ { "byteLength": 60, "uri": "triangle.bin" } ]
}"#;

/// Two materials with identical configuration used by three primitives, one
/// of which carries vertex colors
pub const SHARED_MATERIALS_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "scenes": [ { "nodes": [0, 1] } ],
    "nodes": [
        { "name": "left", "mesh": 0 },
        { "name": "right", "mesh": 1 }
    ],
    "meshes": [
        {
            "primitives": [
                { "attributes": { "POSITION": 0 }, "material": 0 },
                { "attributes": { "POSITION": 0, "COLOR_0": 1 }, "material": 0 }
            ]
        },
        {
            "primitives": [ { "attributes": { "POSITION": 0 }, "material": 1 } ]
        }
    ],
    "materials": [
        { "name": "first", "pbrMetallicRoughness": { "roughnessFactor": 0.5 } },
        { "name": "second", "pbrMetallicRoughness": { "roughnessFactor": 0.5 } }
    ],
    "accessors": [
        {
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 1.0]
        },
        { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC4" }
    ],
    "bufferViews": [ { "buffer": 0, "byteLength": 48 } ],
    "buffers": [ { "byteLength": 48, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA" } ]
}"#;

/// One clearcoat material
pub const CLEARCOAT_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "extensionsUsed": [ "KHR_materials_clearcoat" ],
    "scenes": [ { "nodes": [0] } ],
    "nodes": [ { "name": "coated", "mesh": 0 } ],
    "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 }, "material": 0 } ] } ],
    "materials": [
        {
            "name": "car_paint",
            "extensions": { "KHR_materials_clearcoat": { "clearcoatFactor": 0.8 } }
        }
    ],
    "accessors": [
        {
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [2.0, 2.0, 2.0]
        }
    ],
    "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
    "buffers": [ { "byteLength": 36, "uri": "coated.bin" } ]
}"#;

/// A document with meshes but no nodes
pub const NO_NODES_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
    "accessors": [
        {
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 1.0]
        }
    ],
    "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
    "buffers": [ { "byteLength": 36, "uri": "empty.bin" } ]
}"#;

/// Well-formed JSON whose two nodes are each other's child
pub const CYCLIC_NODES_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "scenes": [ { "nodes": [0] } ],
    "nodes": [
        { "name": "a", "children": [1], "mesh": 0 },
        { "name": "b", "children": [0] }
    ],
    "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 }, "material": 0 } ] } ],
    "materials": [ { "name": "looped" } ],
    "accessors": [
        {
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 1.0]
        }
    ],
    "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
    "buffers": [ { "byteLength": 36, "uri": "looped.bin" } ]
}"#;

/// Minimal document whose single buffer is the GLB binary chunk
pub const GLB_TRIANGLE_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "scenes": [ { "nodes": [0] } ],
    "nodes": [ { "name": "packed", "mesh": 0 } ],
    "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
    "accessors": [
        {
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
        }
    ],
    "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
    "buffers": [ { "byteLength": 36 } ]
}"#;

const GLB_MAGIC: u32 = 0x4654_6C67;
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

/// Pack a JSON document and binary payload into a GLB container
pub fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json_chunk = json.as_bytes().to_vec();
    while json_chunk.len() % 4 != 0 {
        json_chunk.push(b' ');
    }
    let mut bin_chunk = bin.to_vec();
    while bin_chunk.len() % 4 != 0 {
        bin_chunk.push(0);
    }

    let mut total = 12 + 8 + json_chunk.len();
    if !bin_chunk.is_empty() {
        total += 8 + bin_chunk.len();
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json_chunk);

    if !bin_chunk.is_empty() {
        out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(&bin_chunk);
    }
    out
}

/// The packed triangle as a GLB
pub fn triangle_glb() -> Vec<u8> {
    let mut bin = Vec::with_capacity(36);
    for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in v {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    glb(GLB_TRIANGLE_JSON, &bin)
}
