//! # Two-module sensor pipeline
//!
//! Demonstrates the core runtime pieces working together:
//! - A channel module carrying one data element and one operation
//! - A producer module publishing a sample every 500 ms
//! - A consumer module subscribed to changes, reading in its own task
//! - Lifecycle orchestration with dependency ordering
//! - Graceful shutdown on Ctrl+C
//!
//! Run with: `cargo run --example pipeline`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use chassis::{
    ChannelCore, Config, DataElement, ExecutableController, LogWriter, Module, ModuleContext,
    Operation, Sample, TaskOptions,
};

/// Channel module for a speed interface: one element, one operation.
struct SpeedChannel {
    ctx: ModuleContext,
    core: ChannelCore,
    velocity: Arc<DataElement<f64>>,
    clamp: Arc<Operation<(f64, f64), f64>>,
}

impl SpeedChannel {
    fn new(ctx: ModuleContext) -> Self {
        let core = ChannelCore::new();
        let velocity = core.element::<f64>("velocity");
        Self {
            ctx,
            core,
            velocity,
            clamp: Arc::new(Operation::new("clamp")),
        }
    }
}

#[async_trait]
impl Module for SpeedChannel {
    fn name(&self) -> &str {
        self.ctx.name()
    }

    fn dependencies(&self) -> &[String] {
        self.ctx.dependencies()
    }

    async fn init(&self) -> chassis::Result<()> {
        Ok(())
    }

    async fn start(&self) {
        self.ctx.report_operational();
    }

    async fn stop(&self) {}
    async fn deinit(&self) {}

    fn start_event_handler_for_module(&self, module: &str) {
        self.core.activate_module(module);
    }

    fn stop_event_handler_for_module(&self, module: &str) {
        self.core.deactivate_module(module);
    }
}

/// Publishes a slowly oscillating speed sample.
struct SpeedSensor {
    ctx: ModuleContext,
    velocity: Arc<DataElement<f64>>,
    clamp: Arc<Operation<(f64, f64), f64>>,
}

#[async_trait]
impl Module for SpeedSensor {
    fn name(&self) -> &str {
        self.ctx.name()
    }

    fn dependencies(&self) -> &[String] {
        self.ctx.dependencies()
    }

    async fn init(&self) -> chassis::Result<()> {
        self.clamp.register_handler(|(value, limit)| value.min(limit));

        let velocity = Arc::clone(&self.velocity);
        let mut angle: f64 = 0.0;
        self.ctx.executor().run_periodic(
            "Publish",
            Duration::from_millis(500),
            move || {
                angle += 0.3;
                let sample = 90.0 + 30.0 * angle.sin();
                println!("🛞 sensor: publishing {sample:.1} km/h");
                let _ = velocity.set(&sample);
            },
            TaskOptions {
                budget: Duration::from_millis(5),
                ..TaskOptions::default()
            },
        )?;
        Ok(())
    }

    async fn start(&self) {
        self.ctx.report_operational();
    }

    async fn stop(&self) {}
    async fn deinit(&self) {}
}

/// Subscribes to speed changes and polls the latest sample in its own task.
struct Dashboard {
    ctx: ModuleContext,
    velocity: Arc<DataElement<f64>>,
    clamp: Arc<Operation<(f64, f64), f64>>,
}

#[async_trait]
impl Module for Dashboard {
    fn name(&self) -> &str {
        self.ctx.name()
    }

    fn dependencies(&self) -> &[String] {
        self.ctx.dependencies()
    }

    async fn init(&self) -> chassis::Result<()> {
        self.velocity
            .register_handler(self.ctx.name(), |sample: Sample<f64>| {
                println!("📟 dashboard: change notification, now {:.1} km/h", *sample);
            });

        let velocity = Arc::clone(&self.velocity);
        let clamp = Arc::clone(&self.clamp);
        self.ctx.executor().run_periodic(
            "Refresh",
            Duration::from_secs(1),
            move || {
                let mut shown = clamp.invoke((velocity.get(), 100.0));
                if shown.is_ready() {
                    println!("📟 dashboard: display refresh");
                }
            },
            TaskOptions::default(),
        )?;
        Ok(())
    }

    async fn start(&self) {
        self.ctx.report_operational();
    }

    async fn stop(&self) {}
    async fn deinit(&self) {}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), chassis::RuntimeError> {
    println!("🚀 Speed pipeline demo — press Ctrl+C to stop\n");

    let mut controller = ExecutableController::new(Config {
        tick: Duration::from_millis(100),
        ..Config::default()
    })
    .with_subscribers(vec![Arc::new(LogWriter)]);

    let channel = Arc::new(SpeedChannel::new(controller.context("speed_channel", vec![])));
    let sensor = SpeedSensor {
        ctx: controller.context("speed_sensor", vec!["speed_channel".into()]),
        velocity: Arc::clone(&channel.velocity),
        clamp: Arc::clone(&channel.clamp),
    };
    let dashboard = Dashboard {
        ctx: controller.context(
            "dashboard",
            vec!["speed_channel".into(), "speed_sensor".into()],
        ),
        velocity: Arc::clone(&channel.velocity),
        clamp: Arc::clone(&channel.clamp),
    };

    controller.register_module(channel)?;
    controller.register_module(Arc::new(sensor))?;
    controller.register_module(Arc::new(dashboard))?;

    controller.run(false).await?;
    println!("\n✅ clean shutdown");
    Ok(())
}
