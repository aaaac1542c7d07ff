//! # Loader Benchmarks
//!
//! Asset creation throughput for both providers, and instancing cost.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gltfio_native::*;

const SCENE_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "scenes": [ { "nodes": [0] } ],
    "nodes": [
        { "name": "root", "children": [1, 2] },
        { "name": "left", "mesh": 0, "translation": [-2.0, 0.0, 0.0] },
        { "name": "right", "mesh": 0, "translation": [2.0, 0.0, 0.0] }
    ],
    "meshes": [
        {
            "primitives": [
                { "attributes": { "POSITION": 0, "TEXCOORD_0": 1 }, "material": 0 },
                { "attributes": { "POSITION": 0 }, "material": 1 }
            ]
        }
    ],
    "materials": [
        { "name": "painted", "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } },
        { "name": "clear", "alphaMode": "BLEND" }
    ],
    "textures": [ { "source": 0 } ],
    "images": [ { "uri": "paint.png" } ],
    "accessors": [
        {
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [-1.0, -1.0, -1.0], "max": [1.0, 1.0, 1.0]
        },
        { "bufferView": 0, "byteOffset": 36, "componentType": 5126, "count": 3, "type": "VEC2" }
    ],
    "bufferViews": [ { "buffer": 0, "byteLength": 60 } ],
    "buffers": [ { "byteLength": 60, "uri": "scene.bin" } ]
}"#;

fn loader(ubershader: bool) -> AssetLoader {
    let engine = Engine::shared();
    let materials: Box<dyn MaterialProvider> = if ubershader {
        Box::new(UbershaderProvider::new(engine.clone()))
    } else {
        Box::new(JitShaderProvider::new(engine.clone()))
    };

    AssetLoader::create(AssetConfiguration {
        engine,
        materials,
        names: Some(NameComponentManager::new()),
        entities: EntityManager::shared(),
        config: LoaderConfig::default(),
    })
}

fn bench_create_asset(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_asset");
    group.throughput(Throughput::Bytes(SCENE_JSON.len() as u64));

    for (name, ubershader) in [("jit", false), ("ubershader", true)] {
        let mut loader = loader(ubershader);
        group.bench_function(name, |b| {
            b.iter(|| {
                let handle = loader
                    .create_asset_from_json(black_box(SCENE_JSON.as_bytes()))
                    .expect("scene loads");
                loader.destroy_asset(handle);
            });
        });
    }

    group.finish();
}

fn bench_instancing(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_instanced_asset");

    for count in [1usize, 16, 256].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut loader = loader(false);
            b.iter(|| {
                let (handle, instances) = loader
                    .create_instanced_asset(SCENE_JSON.as_bytes(), count)
                    .expect("scene loads");
                black_box(instances.len());
                loader.destroy_asset(handle);
            });
        });
    }

    group.finish();
}

fn bench_material_keys(c: &mut Criterion) {
    c.bench_function("constrain_material", |b| {
        b.iter(|| {
            let mut key = MaterialKey {
                has_base_color_texture: true,
                base_color_uv: 1,
                has_normal_texture: true,
                normal_uv: 0,
                has_emissive_texture: true,
                emissive_uv: 3,
                ..Default::default()
            };
            black_box(material::constrain_material(black_box(&mut key)))
        });
    });
}

criterion_group!(benches, bench_create_asset, bench_instancing, bench_material_keys);
criterion_main!(benches);
