use std::fs;

use flow_import::{
    builder::DefaultSceneBuilder,
    formats::{obj::ObjFormat, ModelFormat},
    import::{ImportOptions, ImportRequest, Importer},
    sched::block_on,
};

const CUBE_OBJ: &str = "\
mtllib cube.mtl
o cube
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
usemtl wood
f 1/1/1 2/2/1 3/3/1
";

const CUBE_MTL: &str = "\
newmtl wood
Kd 0.8 0.6 0.4
map_Kd wood.png
";

#[test]
fn obj_end_to_end_with_on_disk_material_and_texture() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cube.obj"), CUBE_OBJ).unwrap();
    fs::write(dir.path().join("cube.mtl"), CUBE_MTL).unwrap();
    image::RgbaImage::from_pixel(2, 2, image::Rgba([180, 140, 90, 255]))
        .save(dir.path().join("wood.png"))
        .unwrap();

    let importer = Importer::new(ImportOptions::default());
    let mut format = ObjFormat::new();
    let mut builder = DefaultSceneBuilder::new();
    let source_path = dir.path().join("cube.obj").to_string_lossy().into_owned();

    let root = block_on(importer.import(
        ImportRequest::new(&source_path),
        &mut format,
        &mut builder,
    ))
    .unwrap();

    assert_eq!(root.borrow().name(), "cube");
    // A single object, no groups: the mesh node hangs directly off the root.
    assert_eq!(root.borrow().children().len(), 1);
    let object = root.borrow().children()[0].clone();

    let mesh = object.borrow().mesh().unwrap();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.indices.len(), 3);

    let material = object.borrow().material().unwrap();
    assert_eq!(material.name, "wood");
    let diffuse = material.diffuse.as_ref().unwrap();
    assert_eq!(diffuse.dimensions(), (2, 2));
    assert!(material.bump.is_none());
}

#[test]
fn obj_texture_paths_are_listed_without_a_full_parse() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cube.obj"), CUBE_OBJ).unwrap();
    fs::write(dir.path().join("cube.mtl"), CUBE_MTL).unwrap();

    let format = ObjFormat::new();
    let source_path = dir.path().join("cube.obj").to_string_lossy().into_owned();
    let paths = format.parse_texture_paths(&source_path).unwrap();
    assert_eq!(paths, vec!["wood.png".to_string()]);
}
