//! Run with: cargo run --package server --bin generate-types --features typescript

use std::fs;
use std::path::Path;

fn main() {
    println!("Generating TypeScript types...");

    let out_dir = Path::new("web/src/types/generated");

    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("Failed to create output directory: {}", e);
        std::process::exit(1);
    }

    #[cfg(feature = "typescript")]
    {
        use ts_rs::TS;

        roulette_core::Market::export_all_to(out_dir).expect("Failed to export Market");
        roulette_core::UserType::export_all_to(out_dir).expect("Failed to export UserType");
        roulette_core::ProblemType::export_all_to(out_dir).expect("Failed to export ProblemType");
        roulette_core::TechStack::export_all_to(out_dir).expect("Failed to export TechStack");
        roulette_core::ProjectScope::export_all_to(out_dir)
            .expect("Failed to export ProjectScope");
        roulette_core::Combination::export_all_to(out_dir).expect("Failed to export Combination");
        roulette_core::GeneratedIdea::export_all_to(out_dir)
            .expect("Failed to export GeneratedIdea");
        roulette_core::ReasoningModel::export_all_to(out_dir)
            .expect("Failed to export ReasoningModel");
        roulette_core::IdeaGenerationRequest::export_all_to(out_dir)
            .expect("Failed to export IdeaGenerationRequest");
        roulette_core::IdeaGenerationResponse::export_all_to(out_dir)
            .expect("Failed to export IdeaGenerationResponse");

        server::routes::DimensionsResponse::export_all_to(out_dir)
            .expect("Failed to export DimensionsResponse");
        server::routes::ScopeOption::export_all_to(out_dir).expect("Failed to export ScopeOption");

        println!("Types exported to {}", out_dir.display());

        generate_index(out_dir);
    }

    #[cfg(not(feature = "typescript"))]
    {
        eprintln!("Error: typescript feature is not enabled");
        eprintln!("Run with: cargo run --package server --bin generate-types --features typescript");
        std::process::exit(1);
    }
}

#[cfg(feature = "typescript")]
fn generate_index(out_dir: &Path) {
    let exports = [
        "Market",
        "UserType",
        "ProblemType",
        "TechStack",
        "ProjectScope",
        "Combination",
        "GeneratedIdea",
        "ReasoningModel",
        "IdeaGenerationRequest",
        "IdeaGenerationResponse",
        "DimensionsResponse",
        "ScopeOption",
    ];

    let mut index = String::from(
        "// Auto-generated - regenerate with: cargo run --package server --bin generate-types --features typescript\n\n",
    );
    for name in exports {
        index.push_str(&format!("export * from './{}';\n", name));
    }

    let index_path = out_dir.join("index.ts");
    fs::write(&index_path, index).expect("Failed to write index.ts");

    println!("Generated {}", index_path.display());
}
