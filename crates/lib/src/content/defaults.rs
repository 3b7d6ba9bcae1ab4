//! The default content tree shipped with the site.
//!
//! This is the merge base for whatever is persisted remotely and the seed
//! written on first start. Every field the front-end renders has a value
//! here, so new fields added in a release show up with sane defaults even
//! when the persisted tree predates them.
//!
//! Image fields hold references of the form `imagePaths.<group>.<name>`
//! rather than URLs; see [`crate::content::indirection`].

use serde_json::json;

use super::value::Value;

/// Version of the bundled default tree.
///
/// Bump when fields are added or renamed so operators can tell which defaults
/// a deployment merged against.
pub const DEFAULT_CONTENT_VERSION: &str = "2024.11.1";

/// Builds the bundled default content tree.
pub fn default_content() -> Value {
    Value::from(json!({
        "meta": meta(),
        "header": header(),
        "home": home(),
        "about": about(),
        "specialties": specialties(),
        "doctors": doctors(),
        "careers": careers(),
        "contact": contact(),
        "footer": footer(),
        "imagePaths": image_paths()
    }))
}

fn meta() -> serde_json::Value {
    json!({
        "contentVersion": DEFAULT_CONTENT_VERSION,
        "siteName": "St. Aurelia General Hospital"
    })
}

fn header() -> serde_json::Value {
    json!({
        "logo": "imagePaths.brand.logo",
        "emergencyLabel": "24/7 Emergency",
        "emergencyPhone": "+1 (555) 010-0911",
        "nav": [
            {"label": "Home", "target": "home"},
            {"label": "About", "target": "about"},
            {"label": "Specialties", "target": "specialties"},
            {"label": "Doctors", "target": "doctors"},
            {"label": "Careers", "target": "careers"},
            {"label": "Contact", "target": "contact"}
        ]
    })
}

fn home() -> serde_json::Value {
    json!({
        "hero": {
            "title": "Care that puts you first",
            "subtitle": "Comprehensive medical services with a human touch.",
            "cta": "Book an Appointment",
            "image": "imagePaths.hero.main"
        },
        "stats": [
            {"value": "35+", "label": "Years of Service"},
            {"value": "120", "label": "Specialist Doctors"},
            {"value": "400", "label": "Beds"},
            {"value": "24/7", "label": "Emergency Care"}
        ],
        "slides": [
            {"image": "imagePaths.hero.main", "caption": "Modern facilities"},
            {"image": "imagePaths.hero.ward", "caption": "Patient-centred wards"}
        ]
    })
}

fn about() -> serde_json::Value {
    json!({
        "title": "About Us",
        "intro": "Founded in 1989, St. Aurelia has grown into a regional centre for specialised care.",
        "image": "imagePaths.about.building",
        "mission": {
            "title": "Our Mission",
            "text": "To deliver safe, compassionate and evidence-based care to every patient."
        },
        "vision": {
            "title": "Our Vision",
            "text": "To be the most trusted hospital in the region."
        },
        "values": [
            {
                "title": "Compassion",
                "points": ["Treat every patient with dignity", "Listen before we act"]
            },
            {
                "title": "Excellence",
                "points": ["Continuous clinical training", "Outcome-driven care"]
            },
            {
                "title": "Integrity",
                "points": ["Transparent communication", "Ethical practice"]
            }
        ],
        "milestones": [
            {"year": "1989", "text": "Hospital opens with 60 beds"},
            {"year": "2005", "text": "Cardiac centre inaugurated"},
            {"year": "2018", "text": "National accreditation awarded"}
        ]
    })
}

fn specialties() -> serde_json::Value {
    json!({
        "title": "Our Specialties",
        "subtitle": "Expert teams across every major discipline.",
        "items": [
            {
                "name": "Cardiology",
                "description": "Diagnosis and treatment of heart and vascular disease.",
                "image": "imagePaths.specialties.cardiology"
            },
            {
                "name": "Neurology",
                "description": "Care for disorders of the brain, spine and nerves.",
                "image": "imagePaths.specialties.neurology"
            },
            {
                "name": "Orthopaedics",
                "description": "Joint replacement, sports injuries and trauma surgery.",
                "image": "imagePaths.specialties.orthopaedics"
            },
            {
                "name": "Paediatrics",
                "description": "Dedicated care for infants, children and adolescents.",
                "image": "imagePaths.specialties.paediatrics"
            }
        ]
    })
}

fn doctors() -> serde_json::Value {
    json!({
        "title": "Meet Our Doctors",
        "list": [
            {
                "name": "Dr. Elena Marsh",
                "specialty": "Cardiology",
                "photo": "imagePaths.doctors.placeholder"
            },
            {
                "name": "Dr. Rafael Okoye",
                "specialty": "Neurology",
                "photo": "imagePaths.doctors.placeholder"
            }
        ]
    })
}

fn careers() -> serde_json::Value {
    json!({
        "title": "Careers",
        "intro": "Join a team that cares.",
        "jobs": [
            {
                "title": "Staff Nurse (ICU)",
                "department": "Critical Care",
                "type": "Full-time",
                "description": "Registered nurse with two years of ICU experience."
            }
        ]
    })
}

fn contact() -> serde_json::Value {
    json!({
        "title": "Contact Us",
        "address": "1200 Aurelia Avenue, Riverton",
        "phone": "+1 (555) 010-0100",
        "email": "info@staurelia.example",
        "hours": "Outpatient clinics: Mon-Sat, 8:00-18:00",
        "map": "imagePaths.contact.map",
        "faq": {
            "title": "Frequently Asked Questions",
            "questions": [
                {
                    "question": "What are the visiting hours?",
                    "answer": "Visiting hours are 10:00-12:00 and 16:00-20:00 daily."
                },
                {
                    "question": "Do I need a referral to see a specialist?",
                    "answer": "Referrals are recommended but not required for most clinics."
                },
                {
                    "question": "Which insurance plans do you accept?",
                    "answer": "We accept all major insurance plans. Contact billing for details."
                }
            ]
        }
    })
}

fn footer() -> serde_json::Value {
    json!({
        "copyright": "© St. Aurelia General Hospital",
        "tagline": "Caring for our community since 1989."
    })
}

fn image_paths() -> serde_json::Value {
    json!({
        "brand": {"logo": "/images/logo.svg"},
        "hero": {"main": "/images/hero-main.jpg", "ward": "/images/hero-ward.jpg"},
        "about": {"building": "/images/about-building.jpg"},
        "specialties": {
            "cardiology": "/images/specialties/cardiology.jpg",
            "neurology": "/images/specialties/neurology.jpg",
            "orthopaedics": "/images/specialties/orthopaedics.jpg",
            "paediatrics": "/images/specialties/paediatrics.jpg"
        },
        "doctors": {"placeholder": "/images/doctors/placeholder.png"},
        "contact": {"map": "/images/contact-map.png"}
    })
}
