use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-ai")]
#[command(about = "AIレジュメビルダーのCLIクライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// メールアドレスでサインイン
    Signin {
        /// メールアドレス（省略時は対話入力）
        #[arg(short, long)]
        email: Option<String>,
    },

    /// アカウントを作成
    Signup {
        /// メールアドレス（省略時は対話入力）
        #[arg(short, long)]
        email: Option<String>,

        /// 表示名
        #[arg(short, long)]
        name: Option<String>,
    },

    /// サインアウト
    Signout,

    /// サインイン中のアカウントを表示
    Whoami,

    /// 保存済みレジュメの一覧
    List {
        /// タイトルで絞り込み（大文字小文字を区別しない）
        #[arg(short, long)]
        search: Option<String>,
    },

    /// レジュメをアップロード（html/pdf/docx）
    Upload {
        /// アップロードするファイル
        #[arg(required = true)]
        file: PathBuf,
    },

    /// レジュメの内容を表示
    Show {
        /// レジュメID
        #[arg(required = true)]
        id: String,

        /// AI版を表示
        #[arg(long)]
        ai: bool,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// LaTeXソースを表示
    Latex {
        /// レジュメID
        #[arg(required = true)]
        id: String,
    },

    /// レジュメをダウンロード（resume_<id>.html）
    Download {
        /// レジュメID
        #[arg(required = true)]
        id: String,

        /// 保存先ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// レジュメを削除
    Delete {
        /// レジュメID
        #[arg(required = true)]
        id: String,

        /// 確認をスキップ
        #[arg(short, long)]
        yes: bool,
    },

    /// AIと対話してレジュメを改善
    Chat {
        /// レジュメID
        #[arg(required = true)]
        id: String,

        /// 1回だけ送信する指示（省略時は対話モード）
        #[arg(short, long)]
        prompt: Option<String>,

        /// AI版HTML・LaTeXの保存先
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIベースURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
