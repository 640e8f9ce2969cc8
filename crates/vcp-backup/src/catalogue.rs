//! The fixed set of platform resource kinds included in a backup

use vcp_core::ApiResource;

const STORAGE_GROUP: &str = "storage.loft.sh";
const STORAGE_VERSION: &str = "v1";

const fn storage(kind: &'static str, plural: &'static str) -> ApiResource {
    ApiResource {
        group: STORAGE_GROUP,
        version: STORAGE_VERSION,
        kind,
        plural,
    }
}

/// Backed up kinds in collection order. The catalogue name of each entry is
/// its plural, which is also what `--skip` matches against.
pub const CATALOGUE: &[ApiResource] = &[
    storage("ClusterRoleTemplate", "clusterroletemplates"),
    storage("ClusterAccess", "clusteraccesses"),
    storage("SpaceTemplate", "spacetemplates"),
    storage("VirtualClusterTemplate", "virtualclustertemplates"),
    storage("App", "apps"),
    storage("Project", "projects"),
    storage("User", "users"),
    storage("Team", "teams"),
    storage("SharedSecret", "sharedsecrets"),
    storage("AccessKey", "accesskeys"),
    storage("Cluster", "clusters"),
    storage("ClusterAccountTemplate", "clusteraccounttemplates"),
];

/// Catalogue names, in collection order
pub fn kind_names() -> impl Iterator<Item = &'static str> {
    CATALOGUE.iter().map(|resource| resource.plural)
}

pub fn is_known_kind(name: &str) -> bool {
    kind_names().any(|kind| kind == name)
}
