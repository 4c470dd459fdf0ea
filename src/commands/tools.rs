use kubekit_k8s::KubeconfigFile;
use kubekit_table::{Table, installed_mark};

const TOOLS: [(&str, &str); 9] = [
    ("pods", "List pods"),
    ("services", "List services"),
    ("switch-context", "Switch Kubernetes context"),
    ("switch-namespace", "Switch namespace"),
    ("logs", "Show pod logs"),
    ("port-forward", "Port forward to pods/services"),
    ("exec", "Execute commands in pods"),
    ("deploy", "Update image and wait for rollout"),
    ("rollout", "Restart or show rollout status"),
];

const EXAMPLES: [(&str, &str); 7] = [
    ("kubekit pods", "List pods"),
    ("kubekit services -A", "List services in all namespaces"),
    ("kubekit switch-context production", "Switch to production context"),
    ("kubekit logs my-pod -f", "Follow logs"),
    ("kubekit port-forward svc/my-svc 8080:80", "Port forward to service"),
    ("kubekit exec my-pod -- bash", "Exec into pod"),
    ("kubekit deploy api --image repo/api:1.4", "Update image and wait"),
];

/// Prints the tool overview shown when no subcommand is given
pub fn run() {
    println!("Kubernetes CLI Helper Tools");
    println!("===========================");
    println!();

    println!("Available tools:");
    tools_table().print();
    println!();

    let kubeconfig = KubeconfigFile::default_path().ok();
    let found = kubeconfig.as_ref().is_some_and(|p| p.exists());
    println!(
        "Kubeconfig: {} {}",
        installed_mark(found),
        kubeconfig
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string())
    );
    println!();

    println!("Usage examples:");
    for (example, description) in EXAMPLES {
        println!("  {:<42} # {}", example, description);
    }
}

fn tools_table() -> Table {
    let mut table = Table::new(["TOOL", "DESCRIPTION"]);
    for (name, description) in TOOLS {
        table.add_row([name, description]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tool_listed() {
        let rendered = tools_table().render();
        for (name, _) in TOOLS {
            assert!(rendered.contains(&format!("| {} ", name)), "{name} missing");
        }
    }
}
