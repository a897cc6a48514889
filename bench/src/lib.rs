#![allow(clippy::print_stdout)]

use crate::aggregate::{groupby, merge_later_wins, IdentityKey, FILE_SUFFIX_LEN};
use crate::cli::{Command, ReportName, SetArgs, ToolName};
use crate::export::write_csv;
use crate::profiler::Profiler;
use crate::report::{
    format_latex, format_table, AlgorithmComparison, BenchmarkReport, ComparisonReport,
    Mcrl2Comparison, RowTransform, TableLayout,
};
use crate::runner::ProcessRunner;
use crate::tools::{run_tool, BenchmarkTool, BoaTool, Mcrl2Tool, BOA_TAG, MCRL2_TAG};
use anyhow::{bail, Context};
use boa_bench_model::{MergedGroup, FILE_METRIC};
use std::fs;
use std::io;
use std::time::Duration;
use tracing::info;

pub mod aggregate;
pub mod cache;
pub mod cli;
mod environment;
pub mod export;
pub mod extract;
pub mod profiler;
pub mod report;
pub mod runner;
pub mod targets;
pub mod tools;

pub use environment::{BenchContext, BenchmarkingOptions};

/// Executes a `command`.
///
/// - [Command::Run] resolves the profiler and runs a tool on a benchmark set, unless the results
///   of the set are already cached.
/// - [Command::Report] renders a comparison table from cached result sets, optionally also as
///   LaTeX.
/// - [Command::Export] writes a cached result set as CSV.
pub async fn execute_command(
    options: BenchmarkingOptions,
    command: Command,
) -> anyhow::Result<()> {
    let context = BenchContext::try_new(options)?;
    match command {
        Command::Run { tool } => execute_run(&context, tool).await,
        Command::Report { report } => execute_report(&context, report),
        Command::Export {
            set_name,
            repetitions,
            output,
        } => {
            let results = context.cache().load(&set_name, repetitions)?;
            match output {
                Some(path) => {
                    let file = fs::File::create(&path).with_context(|| {
                        format!("Cannot create CSV file '{}'", path.display())
                    })?;
                    write_csv(&results, file)?;
                    println!("Results written to '{}'", path.display());
                }
                None => write_csv(&results, io::stdout().lock())?,
            }
            Ok(())
        }
    }
}

async fn execute_run(context: &BenchContext, tool: ToolName) -> anyhow::Result<()> {
    let (set, tool) = create_tool_instance(tool)?;

    // The profiler is only required if the set actually has to be run.
    let cache_path = context.cache().path(&set.set_name, set.repetitions);
    let runner = if cache_path.exists() {
        info!(path = %cache_path.display(), "Skipping profiler resolution");
        None
    } else {
        Some(ProcessRunner::new(Profiler::resolve()?))
    };

    println!(
        "Benchmarking {} ({}) on '{}' ...",
        tool.tag(),
        tool.algorithm(),
        set.glob
    );
    let runner = runner.as_ref();
    let tool = tool.as_ref();
    let results = context
        .cache()
        .runbench(&set.glob, &set.set_name, set.repetitions, |target, _| {
            let target = target.clone();
            async move {
                let runner = runner.context("The profiler has not been resolved")?;
                run_tool(runner, tool, &target).await
            }
        })
        .await?;

    let timed_out = results.iter().filter(|r| r.is_timed_out()).count();
    println!(
        "Benchmark set '{}' done: {} results ({timed_out} timed out)",
        set.set_name,
        results.len()
    );
    Ok(())
}

fn create_tool_instance(tool: ToolName) -> anyhow::Result<(SetArgs, Box<dyn BenchmarkTool>)> {
    match tool {
        ToolName::Boa {
            set,
            algorithm,
            executable,
            timeout,
        } => {
            let timeout = timeout.map(Duration::from_secs);
            let tool: Box<dyn BenchmarkTool> =
                Box::new(BoaTool::try_new(executable, algorithm, timeout)?);
            Ok((set, tool))
        }
        ToolName::Mcrl2 {
            set,
            equivalence,
            executable,
            timeout,
        } => {
            let timeout = Some(Duration::from_secs(timeout));
            let tool: Box<dyn BenchmarkTool> =
                Box::new(Mcrl2Tool::try_new(executable, equivalence, timeout)?);
            Ok((set, tool))
        }
    }
}

fn execute_report(context: &BenchContext, report: ReportName) -> anyhow::Result<()> {
    match report {
        ReportName::Mcrl2 {
            boa_set,
            mcrl2_set,
            repetitions,
            noise_floor,
            latex,
        } => {
            let boa = context.cache().load(&boa_set, repetitions)?.tag(BOA_TAG);
            let mcrl2 = context.cache().load(&mcrl2_set, repetitions)?.tag(MCRL2_TAG);

            let key = IdentityKey::default();
            let boa = groupby(boa.rows(), |row| key.key(row))?;
            let mcrl2 = groupby(mcrl2.rows(), |row| key.key(row))?;
            let merged = merge_later_wins(boa, mcrl2).with_context(|| {
                format!("Sets '{boa_set}' and '{mcrl2_set}' cover different benchmarks")
            })?;

            let layout = TableLayout::default().with_noise_floor(noise_floor);
            let transform = Mcrl2Comparison::default();
            write_report(context, "mcrl2", repetitions, &merged, &transform, &layout, latex)
        }
        ReportName::Algorithms {
            set_a,
            set_b,
            repetitions,
            noise_floor,
            latex,
        } => {
            if set_a == set_b {
                bail!("Cannot compare set '{set_a}' with itself");
            }
            let a = context.cache().load(&set_a, repetitions)?.tag(&set_a);
            let b = context.cache().load(&set_b, repetitions)?.tag(&set_b);

            let key = IdentityKey::new(
                [a.prefix(), b.prefix()].map(|tag| format!("{tag}-{FILE_METRIC}")),
                FILE_SUFFIX_LEN,
            );
            let a = groupby(a.rows(), |row| key.key(row))?;
            let b = groupby(b.rows(), |row| key.key(row))?;
            let merged = merge_later_wins(a, b).with_context(|| {
                format!("Sets '{set_a}' and '{set_b}' cover different benchmarks")
            })?;

            let layout = match noise_floor {
                Some(noise_floor) => TableLayout::default().with_noise_floor(noise_floor),
                None => TableLayout::default(),
            };
            let transform = AlgorithmComparison::new(set_a, set_b);
            write_report(context, "algorithms", repetitions, &merged, &transform, &layout, latex)
        }
    }
}

fn write_report(
    context: &BenchContext,
    name: &str,
    repetitions: u32,
    merged: &MergedGroup,
    transform: &dyn RowTransform,
    layout: &TableLayout,
    latex: bool,
) -> anyhow::Result<()> {
    let table = format_table(merged, transform, layout)?;
    let mut report = ComparisonReport::new(name, repetitions, table);
    if latex {
        report = report.with_latex(format_latex(merged, transform, layout)?);
    }
    let path = report.write_results(context.results_dir())?;

    println!("{}\n", report.table());
    println!("Report written to '{}'", path.display());
    if latex {
        let latex_path = context.results_dir().join(report.latex_file_name());
        println!("LaTeX table written to '{}'", latex_path.display());
    }
    Ok(())
}
