use std::fmt::Write;

use criterion::{Criterion, criterion_group, criterion_main};
use wirepack::{Format, OutputOptions, RenderPlan};

/// A chain of `modules` modules, each star-imported by its successor
fn namespace_chain_plan(modules: usize) -> RenderPlan {
    let mut source = String::from("entry = \"m0\"\n");
    for index in 0..modules {
        writeln!(source, "\n[[modules]]\nname = \"m{index}\"").ok();
        if index + 1 < modules {
            writeln!(source, "imports = [\"m{}\"]", index + 1).ok();
        }
        writeln!(source, "code = \"var v{index} = {index};\"").ok();
        writeln!(source, "locals = [{{ name = \"v{index}\" }}]").ok();
        writeln!(source, "exports = {{ v{index} = \"v{index}\" }}").ok();
        if index > 0 {
            writeln!(
                source,
                "namespace = {{ references = [{{ module = \"m{}\", name = \"ns{index}\" }}] }}",
                index - 1
            )
            .ok();
        }
    }
    for index in 0..8 {
        writeln!(
            source,
            "\n[[dependencies]]\nid = \"dep{index}\"\nname = \"dep{index}\"\nimports = [{{ imported = \"default\", local = \"dep{index}\" }}]\nexports_default = true"
        )
        .ok();
    }
    RenderPlan::from_toml_str(&source).expect("benchmark plan should parse")
}

fn benchmark_finalisers(c: &mut Criterion) {
    let plan = namespace_chain_plan(200);
    let mut group = c.benchmark_group("finalise");

    for format in [Format::Cjs, Format::Amd, Format::System, Format::Es] {
        let options = OutputOptions {
            format,
            ..OutputOptions::default()
        };
        group.bench_function(format.to_string(), |b| {
            b.iter(|| plan.render(&options).expect("render should succeed"));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_finalisers);
criterion_main!(benches);
