//! Per-domain viability, role, and suggestion rules.
//!
//! Each recognized domain maps to a [`DomainRules`] record of pure
//! functions over [`StackFacts`]. Rules look at *presence* of resolved
//! tools, kinds, and subdomains, never at counts. Suggestion text is static
//! per domain and does not come from the catalog.

use stackplan_types::analysis::PickedTool;

/// Presence queries over the resolved tools of one analysis.
#[derive(Debug, Clone, Copy)]
pub struct StackFacts<'a> {
    picked: &'a [PickedTool],
}

impl<'a> StackFacts<'a> {
    pub fn new(picked: &'a [PickedTool]) -> Self {
        Self { picked }
    }

    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    /// A tool with this id was picked (any component).
    pub fn has_tool(&self, id: &str) -> bool {
        self.picked.iter().any(|p| p.tool.id == id)
    }

    /// A tool from a component of this kind was picked.
    pub fn has_kind(&self, kind: &str) -> bool {
        self.picked.iter().any(|p| p.kind == kind)
    }

    /// A tool from this subdomain was picked.
    pub fn has_subdomain(&self, subdomain: &str) -> bool {
        self.picked.iter().any(|p| p.subdomain == subdomain)
    }
}

/// Rule record for one domain.
pub struct DomainRules {
    pub domain: &'static str,
    pub is_viable: fn(&StackFacts<'_>) -> bool,
    /// Receives the viability verdict so fallbacks can depend on it.
    pub role_hints: fn(&StackFacts<'_>, bool) -> Vec<String>,
    pub suggestions: fn(&StackFacts<'_>) -> Vec<String>,
    pub warnings: fn(&StackFacts<'_>) -> Vec<String>,
}

pub const FULL_STACK_DEVELOPER: &str = "Full-stack Developer";
pub const FRONTEND_DEVELOPER: &str = "Frontend Developer";
pub const BACKEND_DEVELOPER: &str = "Backend Developer";
pub const CLOUD_ENGINEER: &str = "Cloud Engineer";
pub const CLOUD_ARCHITECT: &str = "Cloud Architect";
pub const CONTAINERS_ENGINEER: &str = "Containers / Orchestration Engineer";
pub const MOBILE_DEVELOPER: &str = "Mobile Developer";
pub const DATABASE_ENGINEER: &str = "Database Engineer";
pub const ORM_SPECIALIST: &str = "ORM Specialist";
pub const DEVOPS_ENGINEER: &str = "DevOps Engineer";
pub const CONTAINERIZATION_SPECIALIST: &str = "Containerization Specialist";
pub const SRE: &str = "Site Reliability Engineer (SRE)";
pub const APPSEC_ENGINEER: &str = "Application Security Engineer";
pub const CLOUDSEC_ENGINEER: &str = "Cloud Security Engineer";
pub const SECURITY_ANALYST: &str = "Security Analyst";
pub const GENERALIST_ENGINEER: &str = "Generalist Engineer";

static RULES: [DomainRules; 6] = [
    DomainRules {
        domain: "web",
        is_viable: web_viable,
        role_hints: web_roles,
        suggestions: web_suggestions,
        warnings: no_warnings,
    },
    DomainRules {
        domain: "cloud",
        is_viable: cloud_viable,
        role_hints: cloud_roles,
        suggestions: cloud_suggestions,
        warnings: no_warnings,
    },
    DomainRules {
        domain: "mobile",
        is_viable: mobile_viable,
        role_hints: mobile_roles,
        suggestions: mobile_suggestions,
        warnings: no_warnings,
    },
    DomainRules {
        domain: "database",
        is_viable: database_viable,
        role_hints: database_roles,
        suggestions: database_suggestions,
        warnings: no_warnings,
    },
    DomainRules {
        domain: "devops",
        is_viable: devops_viable,
        role_hints: devops_roles,
        suggestions: devops_suggestions,
        warnings: no_warnings,
    },
    DomainRules {
        domain: "security",
        is_viable: security_viable,
        role_hints: security_roles,
        suggestions: security_suggestions,
        warnings: no_warnings,
    },
];

/// Rules for any domain without a dedicated entry: never viable.
pub static FALLBACK_RULES: DomainRules = DomainRules {
    domain: "*",
    is_viable: never_viable,
    role_hints: generalist_roles,
    suggestions: no_suggestions,
    warnings: no_warnings,
};

/// Look up the rule record for a domain, falling back to [`FALLBACK_RULES`].
pub fn rules_for(domain: &str) -> &'static DomainRules {
    RULES
        .iter()
        .find(|r| r.domain == domain)
        .unwrap_or(&FALLBACK_RULES)
}

pub fn is_recognized(domain: &str) -> bool {
    RULES.iter().any(|r| r.domain == domain)
}

/// Ids of every domain with dedicated rules.
pub fn recognized_domains() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|r| r.domain)
}

fn roles(labels: &[(bool, &str)]) -> Vec<String> {
    labels
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, label)| (*label).to_string())
        .collect()
}

fn no_warnings(_: &StackFacts<'_>) -> Vec<String> {
    Vec::new()
}

fn no_suggestions(_: &StackFacts<'_>) -> Vec<String> {
    Vec::new()
}

fn never_viable(_: &StackFacts<'_>) -> bool {
    false
}

fn generalist_roles(facts: &StackFacts<'_>, _viable: bool) -> Vec<String> {
    roles(&[(!facts.is_empty(), GENERALIST_ENGINEER)])
}

// --- web ---

fn web_viable(f: &StackFacts<'_>) -> bool {
    f.has_kind("framework") && f.has_kind("runtime") && f.has_kind("db")
}

fn web_roles(f: &StackFacts<'_>, viable: bool) -> Vec<String> {
    if viable {
        return roles(&[(true, FULL_STACK_DEVELOPER)]);
    }
    roles(&[
        (f.has_kind("framework"), FRONTEND_DEVELOPER),
        (f.has_kind("db") || f.has_kind("runtime"), BACKEND_DEVELOPER),
    ])
}

fn web_suggestions(f: &StackFacts<'_>) -> Vec<String> {
    roles(&[
        (
            !f.has_kind("framework"),
            "Pick a web framework (React, Angular, Vue) for building your UI.",
        ),
        (
            !f.has_kind("runtime"),
            "Select a runtime (Node.js, Deno) to run your server code.",
        ),
        (
            !f.has_kind("db"),
            "Add a database (PostgreSQL, MongoDB, MySQL) for persistence.",
        ),
    ])
}

// --- cloud ---

fn cloud_viable(f: &StackFacts<'_>) -> bool {
    f.has_subdomain("compute") && f.has_subdomain("storage") && f.has_subdomain("network")
}

fn cloud_roles(f: &StackFacts<'_>, viable: bool) -> Vec<String> {
    roles(&[
        (f.has_subdomain("compute"), CLOUD_ENGINEER),
        (viable, CLOUD_ARCHITECT),
        (
            f.has_tool("docker") || f.has_tool("kubernetes"),
            CONTAINERS_ENGINEER,
        ),
    ])
}

fn cloud_suggestions(f: &StackFacts<'_>) -> Vec<String> {
    roles(&[
        (
            !f.has_subdomain("compute"),
            "Pick a compute service (EC2, Azure VM, Docker) to run workloads.",
        ),
        (
            !f.has_subdomain("storage"),
            "Select storage options like S3 or Azure Blob for persistence.",
        ),
        (
            !f.has_subdomain("network"),
            "Add a networking component like VPC or Route 53 for connectivity.",
        ),
    ])
}

// --- mobile ---

fn mobile_viable(f: &StackFacts<'_>) -> bool {
    f.has_subdomain("framework") || f.has_subdomain("language")
}

fn mobile_roles(f: &StackFacts<'_>, viable: bool) -> Vec<String> {
    // A framework implies viability, so at most one hint is produced.
    roles(&[(f.has_subdomain("framework") || !viable, MOBILE_DEVELOPER)])
}

fn mobile_suggestions(f: &StackFacts<'_>) -> Vec<String> {
    roles(&[
        (
            !f.has_subdomain("framework"),
            "Select a mobile framework (React Native, Flutter) to start development.",
        ),
        (
            !f.has_subdomain("language"),
            "Pick a programming language (Swift, Kotlin) for your app.",
        ),
    ])
}

// --- database ---

fn database_viable(f: &StackFacts<'_>) -> bool {
    f.has_subdomain("engines") || f.has_subdomain("tools")
}

fn database_roles(f: &StackFacts<'_>, _viable: bool) -> Vec<String> {
    roles(&[
        (f.has_subdomain("engines"), DATABASE_ENGINEER),
        (f.has_kind("orm"), ORM_SPECIALIST),
    ])
}

fn database_suggestions(f: &StackFacts<'_>) -> Vec<String> {
    roles(&[
        (
            !f.has_subdomain("engines"),
            "Add a database engine (Postgres, MySQL, MongoDB) for storage.",
        ),
        (
            !f.has_subdomain("tools"),
            "Include database tools (Prisma, TypeORM) for management.",
        ),
    ])
}

// --- devops ---

fn devops_viable(f: &StackFacts<'_>) -> bool {
    f.has_subdomain("ci-cd") || f.has_subdomain("containers") || f.has_subdomain("monitoring")
}

fn devops_roles(f: &StackFacts<'_>, _viable: bool) -> Vec<String> {
    roles(&[
        (f.has_subdomain("ci-cd"), DEVOPS_ENGINEER),
        (f.has_subdomain("containers"), CONTAINERIZATION_SPECIALIST),
        (f.has_subdomain("monitoring"), SRE),
    ])
}

fn devops_suggestions(f: &StackFacts<'_>) -> Vec<String> {
    roles(&[
        (
            !f.has_subdomain("ci-cd"),
            "Pick a CI/CD tool (GitHub Actions, Jenkins) for automation.",
        ),
        (
            !f.has_subdomain("containers"),
            "Add container tools (Docker, Kubernetes) for deployments.",
        ),
        (
            !f.has_subdomain("monitoring"),
            "Include monitoring tools (Prometheus, Grafana) for observability.",
        ),
    ])
}

// --- security ---

fn security_viable(f: &StackFacts<'_>) -> bool {
    f.has_subdomain("appsec") || f.has_subdomain("cloudsec") || f.has_subdomain("monitoring")
}

fn security_roles(f: &StackFacts<'_>, _viable: bool) -> Vec<String> {
    roles(&[
        (f.has_subdomain("appsec"), APPSEC_ENGINEER),
        (f.has_subdomain("cloudsec"), CLOUDSEC_ENGINEER),
        (f.has_subdomain("monitoring"), SECURITY_ANALYST),
    ])
}

fn security_suggestions(f: &StackFacts<'_>) -> Vec<String> {
    roles(&[
        (
            !f.has_subdomain("appsec"),
            "Add app security tools (OWASP, SAST) for code scanning.",
        ),
        (
            !f.has_subdomain("cloudsec"),
            "Include cloud security components (IAM, KMS) for protection.",
        ),
        (
            !f.has_subdomain("monitoring"),
            "Pick monitoring/security tools (SIEM) to detect threats.",
        ),
    ])
}
