use bookbinder::{Book, Epub, ParseOptions, Result, StandardFields};
use clap::Parser;
use std::path::PathBuf;

/// 📚 BookBinder - EPUB包文档查看工具
#[derive(Parser)]
#[command(name = "bookbinder")]
#[command(about = "一个用于解析EPUB包文档（OPF）的Rust工具")]
#[command(version)]
struct Args {
    /// EPUB文件或已解压目录的路径
    #[arg(help = "要处理的EPUB文件路径（也可以是已解压的目录）", required_unless_present = "init_config")]
    epub_file: Option<PathBuf>,

    /// 详细输出模式
    #[arg(short, long, help = "显示详细信息和调试日志")]
    verbose: bool,

    /// 显示元数据信息
    #[arg(short, long, help = "显示EPUB元数据信息")]
    metadata: bool,

    /// 显示清单
    #[arg(long, help = "显示清单中的所有资源")]
    manifest: bool,

    /// 显示脊柱
    #[arg(short, long, help = "显示阅读顺序")]
    spine: bool,

    /// 显示指南
    #[arg(short, long, help = "显示指南参考点")]
    guide: bool,

    /// 显示诊断信息
    #[arg(short, long, help = "显示解析过程中被容忍的问题")]
    diagnostics: bool,

    /// 解析选项配置文件
    #[arg(short, long, help = "YAML格式的解析选项文件")]
    config: Option<PathBuf>,

    /// 生成默认配置文件
    #[arg(long, value_name = "PATH", help = "将默认解析选项写入指定文件后退出")]
    init_config: Option<PathBuf>,

    /// 输出格式
    #[arg(long, value_enum, default_value = "text", help = "输出格式")]
    format: OutputFormat,
}

/// 输出格式
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// 可读文本
    Text,
    /// 完整包文档的YAML
    Yaml,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ 错误: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "bookbinder=debug" } else { "bookbinder=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    if let Some(path) = &args.init_config {
        ParseOptions::write_default(path)?;
        println!("✅ 默认配置已写入: {}", path.display());
        return Ok(());
    }

    let Some(path) = &args.epub_file else {
        return Ok(());
    };
    let options = ParseOptions::load_or_default(args.config.as_deref());

    let book = if path.is_dir() {
        Epub::open_dir(path).load_book_with(&options)?
    } else {
        Epub::open(path)?.load_book_with(&options)?
    };
    let book: Book<StandardFields> = book.extend();

    if args.format == OutputFormat::Yaml {
        print!("{}", book.document().to_yaml()?);
        return Ok(());
    }

    display_summary(&book);

    if args.metadata {
        display_metadata(&book);
    }
    if args.manifest {
        display_manifest(&book, args.verbose);
    }
    if args.spine {
        display_spine(&book);
    }
    if args.guide {
        display_guide(&book);
    }
    if args.diagnostics || args.verbose {
        display_diagnostics(&book);
    }

    Ok(())
}

fn display_summary(book: &Book<StandardFields>) {
    let document = book.document();
    println!("📚 {}", document.title().unwrap_or("未知标题"));
    if let Some(author) = book.first_creator() {
        println!("  作者: {}", author);
    }
    if let Some(version) = document.version() {
        println!("  EPUB版本: {}", version);
    }
    if let Some(identifier) = document.unique_identifier() {
        println!("  唯一标识符: {}", identifier.text);
    }
    if let Some(cover) = book.cover_item() {
        println!("  🖼️  封面: {}", cover.href);
    }
    if let Some(toc) = book.toc_reference() {
        println!("  📑 目录: {}", toc.href);
    }
}

/// 显示EPUB元数据信息
fn display_metadata(book: &Book<StandardFields>) {
    println!("\n📊 EPUB元数据信息:");
    let Some(metadata) = book.document().metadata() else {
        println!("  ⚠️  包文档中没有metadata元素");
        return;
    };

    let titles = metadata.titles();
    if titles.len() > 1 {
        println!("  标题:");
        for (i, title) in titles.iter().enumerate() {
            println!("    {}. {}", i + 1, title);
        }
    } else if let Some(title) = metadata.title() {
        println!("  标题: {}", title);
    }

    for (label, people) in [("作者", metadata.creators()), ("贡献者", metadata.contributors())] {
        if people.is_empty() {
            continue;
        }
        println!("  {}:", label);
        for (i, person) in people.iter().enumerate() {
            let mut info = format!("    {}. {}", i + 1, person.name);
            if let Some(role) = &person.role {
                info.push_str(&format!(" ({})", role));
            }
            if let Some(file_as) = &person.file_as {
                info.push_str(&format!(" [排序: {}]", file_as));
            }
            println!("{}", info);
        }
    }

    if !metadata.languages().is_empty() {
        println!("  语言: {}", metadata.languages().join(", "));
    }
    if let Some(publisher) = metadata.publisher() {
        println!("  出版社: {}", publisher);
    }
    if let Some(date) = metadata.date() {
        println!("  出版日期: {}", date);
    }
    if let Some(description) = metadata.description() {
        println!("  描述: {}", description);
    }
    if let Some(rights) = metadata.rights() {
        println!("  ⚖️  版权: {}", rights);
    }
    if let Some(modified) = metadata.modified_date() {
        println!("  🕐 最后修改: {}", modified);
    }

    let identifiers = metadata.identifiers();
    if !identifiers.is_empty() {
        println!("  🔖 标识符:");
        for (i, identifier) in identifiers.iter().enumerate() {
            let mut info = format!("    {}. {}", i + 1, identifier.text);
            if let Some(scheme) = &identifier.scheme {
                info.push_str(&format!(" ({})", scheme));
            }
            if let Some(id) = &identifier.id {
                info.push_str(&format!(" [ID: {}]", id));
            }
            println!("{}", info);
        }
    }

    for (label, values) in [("🏷️  主题", metadata.subjects()), ("来源", metadata.sources())] {
        if !values.is_empty() {
            println!("  {}: {}", label, values.join(", "));
        }
    }
}

/// 显示清单
fn display_manifest(book: &Book<StandardFields>, verbose: bool) {
    println!("\n📦 清单:");
    let Some(manifest) = book.document().manifest() else {
        println!("  ⚠️  包文档中没有manifest元素");
        return;
    };

    println!("  共 {} 个资源", manifest.len());
    for item in manifest.sorted_items() {
        print!("  {} -> {} ({})", item.id, item.href, item.media_type);
        if verbose {
            if let Some(properties) = &item.properties {
                print!(" [{}]", properties);
            }
        }
        println!();
    }
}

/// 显示阅读顺序
fn display_spine(book: &Book<StandardFields>) {
    println!("\n📖 阅读顺序:");
    let document = book.document();
    let Some(spine) = document.spine() else {
        println!("  ⚠️  包文档中没有spine元素");
        return;
    };

    for (i, itemref) in spine.items.iter().enumerate() {
        let href = document
            .manifest_item(&itemref.idref)
            .map_or("<未找到>", |item| item.href.as_str());
        let linear = if itemref.is_linear() { "" } else { " (非线性)" };
        println!("  {}. {} -> {}{}", i + 1, itemref.idref, href, linear);
    }
}

/// 显示指南参考点
fn display_guide(book: &Book<StandardFields>) {
    println!("\n🧭 指南:");
    let guide = book.document().guide();
    if guide.is_empty() {
        println!("  (无)");
        return;
    }
    for reference in guide {
        println!("  [{}] {} -> {}", reference.ref_type, reference.title, reference.href);
    }
}

/// 显示诊断信息
fn display_diagnostics(book: &Book<StandardFields>) {
    let diagnostics = book.diagnostics();
    println!("\n🩺 诊断信息: {} 条", diagnostics.len());
    for diagnostic in diagnostics {
        println!("  {}", diagnostic);
    }
}
