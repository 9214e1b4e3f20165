use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::db;
use crate::profiles::Profile;

/// Fixed profiles shown when the live table has nothing to offer. They are
/// never written to the shared store; dismissals live in [`SampleStore`].
pub fn sample_profiles() -> Vec<Profile> {
    let now = db::now_ms();
    let mk = |user_id: &str,
              first: &str,
              last: &str,
              age: i64,
              location: &str,
              bio: &str,
              avatar: &str,
              interests: &[&str]| Profile {
        user_id: user_id.to_owned(),
        first_name: Some(first.to_owned()),
        last_name: Some(last.to_owned()),
        age: Some(age),
        location: Some(location.to_owned()),
        bio: Some(bio.to_owned()),
        avatar_url: Some(avatar.to_owned()),
        interests: interests.iter().map(|s| (*s).to_owned()).collect(),
        created_at: now,
        updated_at: now,
    };

    vec![
        mk(
            "550e8400-e29b-41d4-a716-446655440001",
            "Sarah",
            "Johnson",
            28,
            "San Francisco, CA",
            "Adventure seeker who loves hiking, photography, and trying new cuisines. \
             Looking for someone who shares my passion for exploring the world!",
            "https://images.unsplash.com/photo-1494790108755-2616b612b272?w=400&h=400&fit=crop&crop=face",
            &["hiking", "photography", "travel", "cooking", "yoga"],
        ),
        mk(
            "550e8400-e29b-41d4-a716-446655440002",
            "Michael",
            "Chen",
            32,
            "Seattle, WA",
            "Software engineer by day, musician by night. I play guitar in a local band \
             and love discovering new coffee shops around the city.",
            "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=400&h=400&fit=crop&crop=face",
            &["music", "coffee", "technology", "guitar", "concerts"],
        ),
        mk(
            "550e8400-e29b-41d4-a716-446655440003",
            "Emma",
            "Rodriguez",
            26,
            "Austin, TX",
            "Art teacher who believes creativity makes life beautiful. I spend weekends \
             painting, visiting museums, and dancing salsa.",
            "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?w=400&h=400&fit=crop&crop=face",
            &["art", "painting", "dancing", "museums", "teaching"],
        ),
        mk(
            "550e8400-e29b-41d4-a716-446655440004",
            "David",
            "Thompson",
            30,
            "Denver, CO",
            "Fitness enthusiast and personal trainer. I love helping others reach their \
             goals. When I'm not at the gym, you'll find me rock climbing or cooking \
             healthy meals.",
            "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=400&h=400&fit=crop&crop=face",
            &["fitness", "rock climbing", "cooking", "health", "outdoor activities"],
        ),
    ]
}

pub fn is_sample(user_id: &str) -> bool {
    sample_profiles().iter().any(|p| p.user_id == user_id)
}

/// Per-user dismissed-sample ids, persisted to a local JSON file. Sample
/// profiles never reach the shared store, so their swipes land here.
#[derive(Clone)]
pub struct SampleStore {
    path: PathBuf,
    dismissed: Arc<Mutex<HashMap<String, BTreeSet<String>>>>,
}

impl SampleStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let dismissed = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        SampleStore {
            path,
            dismissed: Arc::new(Mutex::new(dismissed)),
        }
    }

    pub fn dismissed(&self, user_id: &str) -> BTreeSet<String> {
        self.dismissed
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn dismiss(&self, user_id: &str, sample_id: &str) {
        let mut dismissed = self.dismissed.lock().unwrap();
        dismissed
            .entry(user_id.to_owned())
            .or_default()
            .insert(sample_id.to_owned());

        match serde_json::to_string_pretty(&*dismissed) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::warn!("couldn't persist sample dismissals: {e}");
                }
            }
            Err(e) => tracing::warn!("couldn't encode sample dismissals: {e}"),
        }
    }
}
