use clap::Parser;
use dialoguer::{Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use resume_ai_common::{
    download_file_name, related_ai_id, sign_in, validate_upload, AuthMode, ChatRole, CreatePage, Credentials,
    Dashboard, ResumeApi, UploadFile,
};
use resume_ai_rust::{cli, client, config, error, preview, session};
use cli::{Cli, Commands};
use client::HttpResumeApi;
use config::Config;
use error::{ResumeAiError, Result};
use preview::PreviewFiles;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    run(cli.command, config).await.map_err(ResumeAiError::normalize)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands, config: Config) -> Result<()> {
    let mut identity = session::open_identity(&Config::config_dir()?);

    match command {
        Commands::Signin { email } => {
            let email = match email {
                Some(email) => email,
                None => Input::<String>::new().with_prompt("メールアドレス").interact_text()?,
            };
            let api = HttpResumeApi::from_config(&config)?;
            let email = sign_in(&api, AuthMode::SignIn, &Credentials::new(email)).await?;
            identity.set(&email)?;
            println!("✔ {} でサインインしました", email);
        }

        Commands::Signup { email, name } => {
            let email = match email {
                Some(email) => email,
                None => Input::<String>::new().with_prompt("メールアドレス").interact_text()?,
            };
            let password = Password::new()
                .with_prompt("パスワード")
                .with_confirmation("パスワード（確認）", "パスワードが一致しません")
                .interact()?;
            let mut credentials = Credentials::new(email).with_password(password);
            if let Some(name) = name {
                credentials = credentials.with_display_name(name);
            }
            let api = HttpResumeApi::from_config(&config)?;
            let email = sign_in(&api, AuthMode::SignUp, &credentials).await?;
            identity.set(&email)?;
            println!("✅ アカウントを作成しました: {}", email);
        }

        Commands::Signout => {
            identity.clear()?;
            println!("✔ サインアウトしました");
        }

        Commands::Whoami => match identity.current() {
            Some(email) => println!("{}", email),
            None => println!("サインインしていません"),
        },

        Commands::List { search } => {
            let email = identity.require()?;
            let api = HttpResumeApi::from_config(&config)?;

            let mut dashboard = Dashboard::new();
            dashboard.begin_loading();
            match api.list_resumes(&email).await {
                Ok(ids) => dashboard.set_resumes(ids),
                Err(error) => return Err(dashboard.fail_loading(error).into()),
            }
            dashboard.set_query(search.unwrap_or_default());

            let visible = dashboard.visible();
            if dashboard.resumes().is_empty() {
                println!("レジュメがありません。`resume-ai upload <file>` で追加してください");
            } else if visible.is_empty() {
                println!("「{}」に一致するレジュメはありません", dashboard.query());
            } else {
                println!("📄 {}件のレジュメ\n", visible.len());
                for resume in visible {
                    println!("  {}  {}", resume.title, resume.id);
                }
            }
        }

        Commands::Upload { file } => {
            let email = identity.require()?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| ResumeAiError::FileNotFound(file.display().to_string()))?;
            // 通信前に拡張子を検証
            validate_upload(&file_name)?;
            if !file.exists() {
                return Err(ResumeAiError::FileNotFound(file.display().to_string()));
            }
            let upload = UploadFile::new(file_name, std::fs::read(&file)?)?;

            let api = HttpResumeApi::from_config(&config)?;
            let mut page = CreatePage::new(PreviewFiles::new(preview_dir()?));
            println!("- アップロード中...");
            let resume_id = page.upload(&api, &email, upload).await?;
            println!("✔ アップロード完了: {}", resume_id);
            println!(
                "  AI版: {}",
                if page.input().ai_tab_enabled(page.shared()) { "あり" } else { "なし" }
            );
        }

        Commands::Show { id, ai, output } => {
            let email = identity.require()?;
            let api = HttpResumeApi::from_config(&config)?;
            let target = if ai { related_ai_id(&id) } else { id.clone() };

            let content = match api.fetch_resume(&target, &email).await {
                Ok(content) => content,
                Err(error) if ai && error.is_expected_absence() => {
                    println!("{} のAI版はまだありません。`resume-ai chat {}` で作成できます", id, id);
                    return Ok(());
                }
                Err(error) => return Err(error.into()),
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, &content.bytes)?;
                    println!("✔ 保存しました: {}", path.display());
                }
                None => std::io::stdout().write_all(&content.bytes)?,
            }
        }

        Commands::Latex { id } => {
            let email = identity.require()?;
            let api = HttpResumeApi::from_config(&config)?;
            println!("{}", api.fetch_latex(&id, &email).await?);
        }

        Commands::Download { id, output } => {
            let email = identity.require()?;
            let api = HttpResumeApi::from_config(&config)?;
            let content = api.fetch_resume(&id, &email).await?;

            let dir = output.unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&dir)?;
            let path = dir.join(download_file_name(&id));
            std::fs::write(&path, &content.bytes)?;
            println!("✔ ダウンロードしました: {}", path.display());
        }

        Commands::Delete { id, yes } => {
            let email = identity.require()?;
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("{} を削除しますか？（元に戻せません）", id))
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("キャンセルしました");
                return Ok(());
            }

            let api = HttpResumeApi::from_config(&config)?;
            let mut dashboard = Dashboard::new();
            dashboard.set_resumes(api.list_resumes(&email).await?);
            dashboard.begin_delete(&id)?;
            let outcome = api.delete_resume(&id, &email).await;
            dashboard.finish_delete(outcome)?;
            println!("✔ 削除しました: {}（残り{}件）", id, dashboard.resumes().len());
        }

        Commands::Chat { id, prompt, out_dir } => {
            let email = identity.require()?;
            let api = HttpResumeApi::from_config(&config)?;
            let out_dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&out_dir)?;

            let mut page = CreatePage::new(PreviewFiles::new(preview_dir()?));
            page.select(&api, &email, &id).await?;
            if let Some(path) = page.input().original_handle() {
                println!("📄 プレビュー: {}", path.display());
            }
            println!(
                "  AI版: {}\n",
                if page.input().ai_tab_enabled(page.shared()) { "あり" } else { "なし" }
            );

            match prompt {
                Some(text) => chat_turn(&mut page, &api, &email, &text, &out_dir).await?,
                None => {
                    println!("指示を入力してください（空行で終了）");
                    loop {
                        let text: String = Input::new()
                            .with_prompt("あなた")
                            .allow_empty(true)
                            .interact_text()?;
                        if text.trim().is_empty() {
                            break;
                        }
                        if let Err(error) = chat_turn(&mut page, &api, &email, &text, &out_dir).await {
                            eprintln!("⚠ {}", error);
                        }
                    }
                }
            }
        }

        Commands::Config { set_api_url, show } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_base_url(url)?;
                println!("✔ APIベースURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!("  APIベースURL: {}", config.api_base_url());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  アカウント: {}", identity.current().unwrap_or("未サインイン"));
            }
        }
    }

    Ok(())
}

fn preview_dir() -> Result<PathBuf> {
    Ok(Config::config_dir()?.join("previews"))
}

/// 1回分のやり取り: 送信、応答表示、AI版とLaTeXの保存
async fn chat_turn(
    page: &mut CreatePage<PreviewFiles>,
    api: &HttpResumeApi,
    email: &str,
    text: &str,
    out_dir: &Path,
) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("AIがレジュメを更新中...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    let result = page.send_prompt(api, email, text).await;
    spinner.finish_and_clear();

    if let Some(turn) = page.output().transcript().last() {
        if turn.role == ChatRole::Assistant {
            let time = turn.timestamp.with_timezone(&chrono::Local).format("%H:%M");
            println!("🤖 [{}] {}", time, turn.text);
        }
    }
    result?;

    if let Some(content) = page.shared().ai_content() {
        let path = out_dir.join(format!("resume_{}_ai.html", content.resume_id));
        std::fs::write(&path, &content.html)?;
        println!("✔ AI版を保存: {}", path.display());
    }
    if let Some(latex) = page.shared().latex() {
        let path = out_dir.join(format!("resume_{}.tex", latex.resume_id));
        std::fs::write(&path, &latex.source)?;
        println!("✔ LaTeXを保存: {}", path.display());
    }
    Ok(())
}
