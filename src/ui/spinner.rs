// ============================================================================
// CardGen - Spinner 加载动画组件
// ============================================================================
//
// 文件: src/ui/spinner.rs
// 职责: 终端加载动画显示组件
// 边界:
//   - ✅ 加载动画显示和控制
//   - ✅ 多线程安全的状态管理
//   - ✅ 自定义消息和进度更新
//   - ✅ 优雅的启动和停止机制
//   - ❌ 不应包含业务逻辑
//   - ❌ 不应包含文件操作
//   - ❌ 不应包含网络请求
//   - ❌ 不应包含数据处理逻辑
//
// ============================================================================

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::utils::constants::spinner_chars;

/// Spinner 加载动画组件
pub struct Spinner {
    /// 是否正在运行
    running: Arc<AtomicBool>,
    /// 前缀消息
    prefix: Arc<Mutex<String>>,
    /// 后缀消息
    suffix: Arc<Mutex<String>>,
    /// 线程句柄
    handle: Option<thread::JoinHandle<()>>,
}

impl Spinner {
    /// 创建新的 Spinner（只有后缀消息）
    pub fn new(message: String) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            prefix: Arc::new(Mutex::new(String::new())),
            suffix: Arc::new(Mutex::new(message)),
            handle: None,
        }
    }

    /// 创建带前缀和后缀的 Spinner
    pub fn new_with_prefix(prefix: String, suffix: String) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            prefix: Arc::new(Mutex::new(prefix)),
            suffix: Arc::new(Mutex::new(suffix)),
            handle: None,
        }
    }

    /// 启动 Spinner
    pub fn start(&mut self) {
        if self.running.load(Ordering::Relaxed) {
            return;
        }

        self.running.store(true, Ordering::Relaxed);

        let running = Arc::clone(&self.running);
        let prefix = Arc::clone(&self.prefix);
        let suffix = Arc::clone(&self.suffix);

        let handle = thread::spawn(move || {
            let mut frame = 0;

            while running.load(Ordering::Relaxed) {
                let spinner_char = spinner_chars::BASE[frame % spinner_chars::BASE.len()];
                let prefix_msg = prefix.lock().map(|msg| msg.clone()).unwrap_or_default();
                let suffix_msg = suffix.lock().map(|msg| msg.clone()).unwrap_or_default();

                // 构建显示文本：prefix + spinner + suffix
                let display_text = if prefix_msg.is_empty() {
                    if suffix_msg.is_empty() {
                        format!("{}", spinner_char)
                    } else {
                        format!("{} {}", spinner_char, suffix_msg)
                    }
                } else if suffix_msg.is_empty() {
                    format!("{} {}", prefix_msg, spinner_char)
                } else {
                    format!("{} {} {}", prefix_msg, spinner_char, suffix_msg)
                };

                // 清除当前行并打印新内容
                print!("\r{}", display_text);
                let _ = io::stdout().flush();

                frame += 1;
                thread::sleep(Duration::from_millis(100));
            }

            // 清除 spinner 行
            print!("\r");
            let _ = io::stdout().flush();
        });

        self.handle = Some(handle);
    }

    /// 停止 Spinner
    pub fn stop(&mut self) {
        if !self.running.load(Ordering::Relaxed) {
            return;
        }

        self.running.store(false, Ordering::Relaxed);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}
