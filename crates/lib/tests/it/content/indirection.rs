use std::str::FromStr;

use sitecms::{
    Edit, PathBuf, Value,
    content::{
        default_content,
        indirection::{normalize_asset_url, resolve_display, resolve_display_value, write_target},
        path,
    },
};
use url::Url;

#[test]
fn test_shared_asset_update_reaches_every_reference() {
    let tree = default_content();

    // Both slides reference hero images; the hero uses the same asset as slide 0
    let hero = PathBuf::from_str("home.hero.image").unwrap();
    let slide = PathBuf::from_str("home.slides[0].image").unwrap();
    assert_eq!(write_target(&tree, &hero), write_target(&tree, &slide));

    let target = write_target(&tree, &hero);
    let updated = path::set(&tree, &target, Edit::Set("/uploads/new-hero.jpg".into())).unwrap();

    let expected = Value::from("/uploads/new-hero.jpg");
    assert_eq!(resolve_display(&updated, &hero), Some(&expected));
    assert_eq!(resolve_display(&updated, &slide), Some(&expected));
    // References are left in place
    assert_eq!(
        path::get(&updated, &hero),
        Some(&Value::from("imagePaths.hero.main"))
    );
}

#[test]
fn test_doctor_photos_share_placeholder() {
    let tree = default_content();
    let first = resolve_display_value(&tree, "doctors.list[0].photo");
    let second = resolve_display_value(&tree, "doctors.list[1].photo");
    assert_eq!(first, Some(&Value::from("/images/doctors/placeholder.png")));
    assert_eq!(first, second);
}

#[test]
fn test_plain_text_fields_display_as_is() {
    let tree = default_content();
    assert_eq!(
        resolve_display_value(&tree, "about.mission.title"),
        path::get_str(&tree, "about.mission.title")
    );
    assert_eq!(resolve_display_value(&tree, "about.nothing.here"), None);
}

#[test]
fn test_replacing_reference_with_literal() {
    let tree = default_content();
    let logo = PathBuf::from_str("header.logo").unwrap();

    // A direct write at the field path drops the reference
    let updated = path::set(&tree, &logo, Edit::Set("https://cdn.example/logo.svg".into())).unwrap();
    assert_eq!(
        resolve_display(&updated, &logo),
        Some(&Value::from("https://cdn.example/logo.svg"))
    );
    assert_eq!(write_target(&updated, &logo), logo);
    // The shared asset is untouched
    assert_eq!(
        updated.get_path("imagePaths.brand.logo"),
        Some(&Value::from("/images/logo.svg"))
    );
}

#[test]
fn test_normalize_keeps_foreign_and_relative_urls() {
    let origin = Url::parse("https://staurelia.example").unwrap();

    assert_eq!(
        normalize_asset_url("https://staurelia.example/uploads/x.jpg#top", Some(&origin)),
        "/uploads/x.jpg#top"
    );
    assert_eq!(
        normalize_asset_url("http://staurelia.example/uploads/x.jpg", Some(&origin)),
        "http://staurelia.example/uploads/x.jpg"
    );
    assert_eq!(normalize_asset_url("uploads/x.jpg", Some(&origin)), "uploads/x.jpg");
    assert_eq!(normalize_asset_url("", Some(&origin)), "");
}
