/// Benchmark runner for the module loader.
///
/// Times a cold import of generated module graphs through the script
/// evaluator.

extern crate modlink;

use modlink::runner::ds::value::Value;
use modlink::runner::eval::ScriptEvaluator;
use modlink::runner::loader::{MemoryFetcher, System};
use std::time::{Duration, Instant};

/// `/m0.js` imports `/m1.js`, which imports `/m2.js`, and so on.
fn chain_graph(size: usize) -> MemoryFetcher {
    let mut fetcher = MemoryFetcher::new();
    for i in 0..size {
        let source = if i + 1 == size {
            format!("register [] {{ export depth = {}; }}", i)
        } else {
            format!(
                r#"register ["./m{next}.js"] {{
                    import "./m{next}.js" as next;
                    execute {{ export depth = next.depth; }}
                }}"#,
                next = i + 1
            )
        };
        fetcher.insert(format!("/m{}.js", i), source);
    }
    fetcher
}

/// Every module imports every later one.
fn dense_graph(size: usize) -> MemoryFetcher {
    let mut fetcher = MemoryFetcher::new();
    for i in 0..size {
        let deps: Vec<String> = ((i + 1)..size).map(|j| format!("\"./m{}.js\"", j)).collect();
        let source = format!(
            "register [{}] {{ export id = {}; execute {{ log id; }} }}",
            deps.join(", "),
            i
        );
        fetcher.insert(format!("/m{}.js", i), source);
    }
    fetcher
}

/// Star of modules re-exporting each other through `/index.js`.
fn reexport_graph(size: usize) -> MemoryFetcher {
    let mut fetcher = MemoryFetcher::new();
    let deps: Vec<String> = (0..size).map(|j| format!("\"./m{}.js\"", j)).collect();
    let mut body = String::new();
    for j in 0..size {
        body.push_str(&format!("import \"./m{j}.js\" as m{j}; export * from m{j};\n", j = j));
    }
    fetcher.insert(
        "/m_index.js",
        format!("register [{}] {{\n{}}}", deps.join(", "), body),
    );
    for j in 0..size {
        fetcher.insert(
            format!("/m{}.js", j),
            format!("register [] {{ execute {{ export value{} = {}; }} }}", j, j),
        );
    }
    fetcher
}

fn run_benchmark<F>(build: F, entry: &str, iterations: u32) -> (Duration, Value)
where
    F: Fn() -> MemoryFetcher,
{
    let mut last = Value::Undefined;
    let start = Instant::now();

    for _ in 0..iterations {
        let system = System::builder(build(), ScriptEvaluator::new()).build();
        match system.import(entry) {
            Ok(exports) => last = Value::Object(exports),
            Err(err) => {
                eprintln!("Benchmark import failed: {}", err);
                break;
            }
        }
    }

    (start.elapsed(), last)
}

fn main() {
    println!("=======================================================");
    println!("  Module Loader Benchmarks");
    println!("=======================================================\n");

    let benchmarks: Vec<(&str, Box<dyn Fn() -> MemoryFetcher>, &str, u32)> = vec![
        ("Chain (200 modules)", Box::new(|| chain_graph(200)), "/m0.js", 50),
        ("Dense (40 modules)", Box::new(|| dense_graph(40)), "/m0.js", 50),
        ("Re-export (100 modules)", Box::new(|| reexport_graph(100)), "/m_index.js", 50),
    ];

    println!("{:<30} {:>12} {:>12}", "Benchmark", "Total", "Per import");
    println!("{}", "-".repeat(56));

    for (name, build, entry, iterations) in benchmarks {
        let (duration, exports) = run_benchmark(build, entry, iterations);
        println!(
            "{:<30} {:>12.2?} {:>12.2?}",
            name,
            duration,
            duration / iterations
        );
        if let Value::Undefined = exports {
            println!("  (no exports, see error above)");
        }
    }
}
