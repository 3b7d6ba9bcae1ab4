use serde_json::json;
use sitecms::{
    Edit, Value,
    content::{default_content, merge::deep_merge, path},
};

use super::leaf_paths;

#[test]
fn test_merge_identities_on_default_tree() {
    let defaults = default_content();

    assert_eq!(deep_merge(&defaults, &Value::map()), defaults);
    assert_eq!(deep_merge(&Value::map(), &defaults), defaults);
    assert_eq!(deep_merge(&defaults, &defaults), defaults);
}

#[test]
fn test_persisted_values_win_at_every_leaf() {
    let defaults = default_content();

    // A persisted tree that overrides every leaf of the defaults
    let mut persisted = defaults.clone();
    for raw in leaf_paths(&defaults) {
        persisted = path::set_str(&persisted, &raw, Edit::Set(format!("saved {raw}").into())).unwrap();
    }

    let merged = deep_merge(&defaults, &persisted);
    for raw in leaf_paths(&defaults) {
        assert_eq!(
            path::get_str(&merged, &raw),
            Some(&Value::from(format!("saved {raw}"))),
            "persisted value lost at {raw}"
        );
    }
}

#[test]
fn test_new_default_fields_show_up_in_old_persisted_tree() {
    // A tree saved by an older release: no FAQ, one edited title
    let persisted = Value::from(json!({
        "about": {"title": "About St. Aurelia"},
        "contact": {"title": "Get in touch", "phone": "+1 (555) 999-0000"}
    }));

    let merged = deep_merge(&default_content(), &persisted);

    assert_eq!(merged.get_path("about.title"), Some(&Value::from("About St. Aurelia")));
    assert_eq!(merged.get_path("about.mission.title"), Some(&Value::from("Our Mission")));
    assert_eq!(merged.get_path("contact.phone"), Some(&Value::from("+1 (555) 999-0000")));
    assert_eq!(
        merged.get_path("contact.faq.questions[1].question"),
        Some(&Value::from("Do I need a referral to see a specialist?"))
    );
}

#[test]
fn test_persisted_lists_replace_default_lists() {
    let persisted = Value::from(json!({
        "careers": {"jobs": []},
        "about": {"values": [{"title": "Only One"}]}
    }));

    let merged = deep_merge(&default_content(), &persisted);

    assert_eq!(merged.get_path("careers.jobs"), Some(&Value::list()));
    assert_eq!(
        merged.get_path("about.values"),
        Some(&Value::from(json!([{"title": "Only One"}])))
    );
    assert!(merged.get_path("about.values[0].points").is_none());
}

#[test]
fn test_persisted_only_keys_are_kept() {
    let persisted = Value::from(json!({"campaign": {"banner": "Flu shots now available"}}));
    let merged = deep_merge(&default_content(), &persisted);

    assert_eq!(
        merged.get_path("campaign.banner"),
        Some(&Value::from("Flu shots now available"))
    );
    assert!(merged.get_path("home.hero.title").is_some());
}

#[test]
fn test_scalar_overlay_replaces_section() {
    let persisted = Value::from(json!({"footer": null}));
    let merged = deep_merge(&default_content(), &persisted);
    assert_eq!(merged.get_path("footer"), Some(&Value::Null));
}
