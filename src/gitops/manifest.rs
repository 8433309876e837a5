// ABOUTME: Application resource payloads for registration.
// ABOUTME: Wave ordering is carried as the sync-wave annotation.

use crate::types::UnitName;

/// Everything needed to register one application with the API.
#[derive(Debug)]
pub struct AppManifest<'a> {
    pub name: &'a UnitName,
    pub project: &'a str,
    pub repo_url: &'a str,
    pub revision: &'a str,
    pub path: &'a str,
    pub dest_server: &'a str,
    pub namespace: &'a str,
    pub wave: u32,
}

impl AppManifest<'_> {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "metadata": {
                "name": self.name.as_str(),
                "annotations": {
                    "argocd.argoproj.io/sync-wave": self.wave.to_string(),
                },
            },
            "spec": {
                "project": self.project,
                "source": {
                    "repoURL": self.repo_url,
                    "targetRevision": self.revision,
                    "path": self.path,
                },
                "destination": {
                    "server": self.dest_server,
                    "namespace": self.namespace,
                },
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_carries_wave_annotation_and_source() {
        let name = UnitName::new("storage").unwrap();
        let manifest = AppManifest {
            name: &name,
            project: "logging",
            repo_url: "https://github.com/org/logging-stack",
            revision: "main",
            path: "apps/storage",
            dest_server: "https://kubernetes.default.svc",
            namespace: "openshift-logging",
            wave: 2,
        };

        let json = manifest.to_json();
        assert_eq!(json["metadata"]["name"], "storage");
        assert_eq!(
            json["metadata"]["annotations"]["argocd.argoproj.io/sync-wave"],
            "2"
        );
        assert_eq!(json["spec"]["source"]["path"], "apps/storage");
        assert_eq!(json["spec"]["destination"]["namespace"], "openshift-logging");
    }
}
