//! Model CLI commands

use std::path::Path;

use crate::inspect::inspect_model;
use crate::options::DecodeOptions;

/// Inspect a model file and display its structure, or write it as JSON.
pub fn inspect(path: &Path, output: Option<&Path>, options: &DecodeOptions) -> anyhow::Result<()> {
    println!("Inspecting model file: {}", path.display());
    println!();

    let info = inspect_model(path, options)?;

    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&info)?;
        std::fs::write(output, json)?;
        println!("Written to: {}", output.display());
        return Ok(());
    }

    println!("Model File Information");
    println!("======================");
    println!("Kind:        {} ({:?})", info.kind.as_str(), info.kind);
    println!("Version:     {}", info.version);
    println!("Objects:     {}", info.object_count);
    println!("Textures:    {}", info.texture_count);
    println!("Meshes:      {}", info.mesh_count);
    println!("Vertices:    {}", info.vertex_count);
    println!("Triangles:   {}", info.triangle_count);
    println!();

    for object in &info.objects {
        println!(
            "Object {} (flags {:#x}, radius {:.3})",
            object.index, object.flags, object.radius
        );
        for mesh in &object.meshes {
            println!(
                "  - {} ({} vertices, {} triangles, {} strip breaks{})",
                mesh.name,
                mesh.vertex_count,
                mesh.triangle_count,
                mesh.skipped_vertices,
                if mesh.skinned { ", skinned" } else { "" }
            );
        }
    }

    println!();
    if info.skeleton.bone_count == 0 {
        println!("Skeleton: None");
    } else {
        println!("Skeleton: {} bones", info.skeleton.bone_count);
        println!("  Roots:       {:?}", info.skeleton.roots);
        for (bone, object) in &info.skeleton.attachments {
            println!("  Bone {bone:3} -> object {object}");
        }
    }

    Ok(())
}
